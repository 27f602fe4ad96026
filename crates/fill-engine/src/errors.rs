//! Engine error types.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::model::MissingField;

/// A browser-port call failed.
#[derive(Debug, Error, Clone)]
pub enum PortError {
    /// A single driver call failed; the session may still be usable.
    #[error("driver call failed: {0}")]
    Call(String),

    /// The browser session is gone; nothing further will succeed.
    #[error("browser session lost: {0}")]
    Session(String),
}

/// Failure to apply one field. Caught per field; required fields escalate
/// into the collected missing-required report, optional fields are skipped.
#[derive(Debug, Error, Clone)]
pub enum ApplyError {
    #[error("no control found for label '{0}'")]
    ControlNotFound(String),

    #[error("value still empty after entering text")]
    ValueNotSet,

    #[error("no dropdown option matched '{wanted}'")]
    OptionNotMatched { wanted: String },

    #[error(transparent)]
    Port(#[from] PortError),
}

/// Fatal engine outcomes.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("form did not become ready within {0:?} (sign-in not completed in time?)")]
    ReadinessTimeout(Duration),

    #[error("required fields could not be filled: {}", format_missing(.0))]
    MissingControls(Vec<MissingField>),

    #[error(
        "submission not confirmed after {attempts} attempts; see diagnostics under {}",
        diagnostics_dir.display()
    )]
    SubmitNotConfirmed {
        attempts: u32,
        diagnostics_dir: PathBuf,
    },

    #[error(transparent)]
    Port(#[from] PortError),
}

fn format_missing(missing: &[MissingField]) -> String {
    missing
        .iter()
        .map(|m| format!("{} (id={})", m.label, m.id))
        .collect::<Vec<_>>()
        .join(", ")
}
