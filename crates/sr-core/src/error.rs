//! Core errors
//!
//! Engine operations never fail on bad selectors, bad arguments or
//! detached nodes; these errors cover configuration and the idle loop guard.

#[derive(Debug, thiserror::Error)]
pub enum SrError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Configuration parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Scheduler still busy after {steps} steps")]
    StepLimit { steps: usize },
}
