//! Adapter error types.

use thiserror::Error;

use fill_engine::PortError;

/// Failures raised by the CDP backend.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The browser never came up. Carries remediation guidance because the
    /// cause is almost always environmental, not a bug in the run.
    #[error("browser launch failed: {reason}. {remediation}", remediation = LAUNCH_REMEDIATION)]
    Launch { reason: String },

    /// A DevTools call failed after launch.
    #[error("CDP call failed: {0}")]
    Cdp(String),
}

pub(crate) const LAUNCH_REMEDIATION: &str = "Install Chrome or Chromium (or pass \
--browser-binary with an explicit path), make sure the version matches the \
protocol the adapter speaks, and remove a stale SingletonLock file from the \
profile directory if a previous run crashed";

impl AdapterError {
    pub fn launch(reason: impl Into<String>) -> Self {
        Self::Launch {
            reason: reason.into(),
        }
    }
}

impl From<AdapterError> for PortError {
    fn from(err: AdapterError) -> Self {
        PortError::Call(err.to_string())
    }
}
