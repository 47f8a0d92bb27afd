//! Runtime configuration

use serde::Deserialize;

use crate::SrError;

/// Animation timing defaults
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FxConfig {
    /// Duration for the `slow` speed name
    pub slow_ms: u64,
    /// Duration for the `fast` speed name
    pub fast_ms: u64,
    /// Duration when none is given
    pub default_ms: u64,
    /// Extra time before the failsafe finalizes a transition step
    pub failsafe_margin_ms: u64,
    /// Easing name used by `animate` when none is given
    pub default_easing: String,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            slow_ms: 600,
            fast_ms: 200,
            default_ms: 400,
            failsafe_margin_ms: 50,
            default_easing: "swing".to_string(),
        }
    }
}

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub fx: FxConfig,
    /// Animation-frame cadence of the virtual clock
    pub frame_interval_ms: u64,
    /// Upper bound on scheduler steps taken by `run_until_idle`
    pub idle_step_limit: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            fx: FxConfig::default(),
            frame_interval_ms: 16,
            idle_step_limit: 100_000,
        }
    }
}

impl RuntimeConfig {
    /// Load from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, SrError> {
        let config: RuntimeConfig = serde_json::from_str(json)?;
        if config.frame_interval_ms == 0 {
            return Err(SrError::Config("frame_interval_ms must be positive".into()));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.fx.slow_ms, 600);
        assert_eq!(config.fx.fast_ms, 200);
        assert_eq!(config.fx.default_ms, 400);
        assert_eq!(config.fx.failsafe_margin_ms, 50);
        assert_eq!(config.frame_interval_ms, 16);
    }

    #[test]
    fn test_partial_json() {
        let config = RuntimeConfig::from_json(r#"{ "fx": { "fast_ms": 100 } }"#).unwrap();
        assert_eq!(config.fx.fast_ms, 100);
        assert_eq!(config.fx.slow_ms, 600);
        assert_eq!(config.idle_step_limit, 100_000);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(RuntimeConfig::from_json("{"), Err(SrError::Json(_))));
        assert!(matches!(
            RuntimeConfig::from_json(r#"{ "frame_interval_ms": 0 }"#),
            Err(SrError::Config(_))
        ));
    }
}
