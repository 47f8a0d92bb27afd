//! Cooperative request abort
//!
//! A signal is shared between the caller and the request. The first reason
//! recorded wins, so a timeout that fires before a manual abort is still
//! reported as a timeout.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::AjaxError;

/// Why a request was aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// `AbortSignal::abort` was called
    Manual,
    /// The request ran past its timeout
    Timeout { timeout_ms: u64 },
}

impl From<AbortReason> for AjaxError {
    fn from(reason: AbortReason) -> Self {
        match reason {
            AbortReason::Manual => AjaxError::Aborted,
            AbortReason::Timeout { timeout_ms } => AjaxError::Timeout { timeout_ms },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    reason: Arc<Mutex<Option<AbortReason>>>,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<AbortReason>> {
        match self.reason.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Abort the request
    pub fn abort(&self) {
        self.abort_with(AbortReason::Manual);
    }

    pub(crate) fn abort_with(&self, reason: AbortReason) {
        let mut current = self.lock();
        if current.is_none() {
            tracing::debug!("Request aborted: {:?}", reason);
            *current = Some(reason);
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.lock().is_some()
    }

    pub fn reason(&self) -> Option<AbortReason> {
        *self.lock()
    }

    /// `Err` with the recorded reason once aborted
    pub(crate) fn check(&self) -> Result<(), AjaxError> {
        match self.reason() {
            Some(reason) => Err(reason.into()),
            None => Ok(()),
        }
    }
}
