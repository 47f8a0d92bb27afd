//! Animation arguments: speeds, easings, completion callbacks

use std::fmt;
use std::rc::Rc;

use sr_dom::NodeId;

use crate::config::FxConfig;
use crate::Runtime;

/// Completion callback, run with the animated node
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(&mut Runtime, NodeId)>);

impl Callback {
    pub fn new(f: impl Fn(&mut Runtime, NodeId) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub(crate) fn call(&self, rt: &mut Runtime, node: NodeId) {
        (self.0)(rt, node)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// Animation duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    Slow,
    Fast,
    Default,
    Millis(u64),
}

impl Speed {
    /// Named speed (`slow`, `fast`, `_default`)
    pub fn parse(name: &str) -> Option<Speed> {
        match name {
            "slow" => Some(Speed::Slow),
            "fast" => Some(Speed::Fast),
            "_default" => Some(Speed::Default),
            _ => None,
        }
    }

    pub fn millis(self, config: &FxConfig) -> u64 {
        match self {
            Speed::Slow => config.slow_ms,
            Speed::Fast => config.fast_ms,
            Speed::Default => config.default_ms,
            Speed::Millis(ms) => ms,
        }
    }
}

/// Named easing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    Swing,
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    pub fn parse(name: &str) -> Option<Easing> {
        match name {
            "linear" => Some(Easing::Linear),
            "swing" => Some(Easing::Swing),
            "ease" => Some(Easing::Ease),
            "ease-in" => Some(Easing::EaseIn),
            "ease-out" => Some(Easing::EaseOut),
            "ease-in-out" => Some(Easing::EaseInOut),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::Swing => "swing",
            Easing::Ease => "ease",
            Easing::EaseIn => "ease-in",
            Easing::EaseOut => "ease-out",
            Easing::EaseInOut => "ease-in-out",
        }
    }

    /// CSS timing function keyword
    pub fn css(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::Swing | Easing::EaseOut => "ease-out",
            Easing::Ease => "ease",
            Easing::EaseIn => "ease-in",
            Easing::EaseInOut => "ease-in-out",
        }
    }
}

/// Options accepted by `animate` and the effects
#[derive(Debug, Clone, Default)]
pub struct FxOptions {
    pub duration: Option<Speed>,
    /// Easing name; unknown names fall back to `swing`
    pub easing: Option<String>,
    pub complete: Option<Callback>,
}

impl FxOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duration(mut self, ms: u64) -> Self {
        self.duration = Some(Speed::Millis(ms));
        self
    }

    /// A speed name, or else an easing name with the default duration
    pub fn speed(mut self, name: &str) -> Self {
        match Speed::parse(name) {
            Some(speed) => self.duration = Some(speed),
            None => {
                self.duration = Some(Speed::Default);
                self.easing = Some(name.to_string());
            }
        }
        self
    }

    pub fn easing(mut self, name: &str) -> Self {
        self.easing = Some(name.to_string());
        self
    }

    pub fn complete(mut self, callback: Callback) -> Self {
        self.complete = Some(callback);
        self
    }

    /// Resolve against the configuration. `default_easing` applies when no
    /// easing was given.
    pub(crate) fn resolve(&self, config: &FxConfig, default_easing: &str) -> ResolvedFx {
        let duration_ms = self.duration.unwrap_or(Speed::Default).millis(config);
        let name = self.easing.as_deref().unwrap_or(default_easing);
        let easing = Easing::parse(name).unwrap_or_else(|| {
            tracing::debug!("Unknown easing {:?}, using swing", name);
            Easing::Swing
        });
        ResolvedFx {
            duration_ms,
            easing,
            complete: self.complete.clone(),
        }
    }
}

impl From<u64> for FxOptions {
    fn from(ms: u64) -> Self {
        FxOptions::new().duration(ms)
    }
}

impl From<i32> for FxOptions {
    fn from(ms: i32) -> Self {
        FxOptions::new().duration(ms.max(0) as u64)
    }
}

impl From<&str> for FxOptions {
    fn from(name: &str) -> Self {
        FxOptions::new().speed(name)
    }
}

impl From<Speed> for FxOptions {
    fn from(speed: Speed) -> Self {
        FxOptions {
            duration: Some(speed),
            ..FxOptions::default()
        }
    }
}

impl From<Callback> for FxOptions {
    fn from(callback: Callback) -> Self {
        FxOptions::new().complete(callback)
    }
}

/// Fully resolved animation arguments
#[derive(Debug, Clone)]
pub(crate) struct ResolvedFx {
    pub(crate) duration_ms: u64,
    pub(crate) easing: Easing,
    pub(crate) complete: Option<Callback>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_speeds() {
        let config = FxConfig::default();
        assert_eq!(FxOptions::from("slow").resolve(&config, "swing").duration_ms, 600);
        assert_eq!(FxOptions::from("fast").resolve(&config, "swing").duration_ms, 200);
        assert_eq!(FxOptions::new().resolve(&config, "swing").duration_ms, 400);
        assert_eq!(FxOptions::from(250).resolve(&config, "swing").duration_ms, 250);
    }

    #[test]
    fn test_speed_string_as_easing() {
        let config = FxConfig::default();
        let resolved = FxOptions::from("linear").resolve(&config, "swing");
        assert_eq!(resolved.duration_ms, 400);
        assert_eq!(resolved.easing, Easing::Linear);
    }

    #[test]
    fn test_easing_fallback() {
        let config = FxConfig::default();
        let resolved = FxOptions::new().easing("bounce").resolve(&config, "linear");
        assert_eq!(resolved.easing, Easing::Swing);
        assert_eq!(resolved.easing.css(), "ease-out");

        let resolved = FxOptions::new().resolve(&config, "linear");
        assert_eq!(resolved.easing.css(), "linear");
    }
}
