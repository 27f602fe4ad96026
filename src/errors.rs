//! Run-level errors and their process exit codes.

use std::path::PathBuf;

use thiserror::Error;

use cdp_adapter::AdapterError;
use fill_engine::EngineError;
use issueform_core_types::FormError;

/// Everything that can end a run early.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("missing work order path; pass --work-order <path>")]
    MissingWorkOrderPath,

    #[error("work order not found at {}", path.display())]
    WorkOrderNotFound { path: PathBuf },

    #[error("work order at {} is not valid JSON: {source}", path.display())]
    WorkOrderParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "{count} required field(s) missing; see {}",
        report.display()
    )]
    MissingRequired { count: usize, report: PathBuf },

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("field schema: {0}")]
    Schema(String),

    #[error(transparent)]
    Driver(#[from] AdapterError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl RunError {
    /// Process exit code: 2 for work orders that can never succeed as
    /// given (missing path, missing required fields), 1 for everything
    /// else, 0 is reserved for success paths.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::MissingWorkOrderPath
            | RunError::WorkOrderNotFound { .. }
            | RunError::MissingRequired { .. } => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(RunError::MissingWorkOrderPath.exit_code(), 2);
        assert_eq!(
            RunError::MissingRequired {
                count: 1,
                report: PathBuf::from("r.json")
            }
            .exit_code(),
            2
        );
        assert_eq!(
            RunError::Schema("bad yaml".to_string()).exit_code(),
            1
        );
        assert_eq!(
            RunError::Form(FormError::UnsupportedRepo("a/b".to_string())).exit_code(),
            1
        );
    }
}
