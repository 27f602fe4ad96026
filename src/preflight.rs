//! Pre-browser validation of required fields.
//!
//! Launching the browser is the expensive step of a run (and may park on a
//! human sign-in), so a work order that can never submit must be rejected
//! before any session exists.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::error;

use fill_engine::MissingField;
use issueform_core_types::{FieldSchema, IssueType, WorkOrder};

use crate::errors::RunError;

pub const REPORT_FILE: &str = "work_order_validation_report.json";

#[derive(Serialize)]
pub struct ValidationReport {
    pub ok: bool,
    pub issue_type: IssueType,
    pub missing_required: Vec<MissingField>,
    pub hint: String,
}

/// Check every required schema field against the normalized work order.
///
/// On any miss: write the structured report into the diagnostics
/// directory, log the complete list, and return the distinct
/// missing-required error. No browser is launched on this path.
pub fn validate(
    schema: &[FieldSchema],
    order: &WorkOrder,
    diagnostics_dir: &Path,
) -> Result<(), RunError> {
    let missing: Vec<MissingField> = schema
        .iter()
        .filter(|field| field.required)
        .filter(|field| order.effective_value(&field.id).trim().is_empty())
        .map(|field| MissingField {
            id: field.id.clone(),
            label: field.label.clone(),
            kind: field.kind,
        })
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    for field in &missing {
        error!(id = %field.id, label = %field.label, kind = field.kind.as_str(), "required field is empty");
    }

    let report = ValidationReport {
        ok: false,
        issue_type: order.issue_type,
        missing_required: missing,
        hint: "Fill these fields in work_order.json (align keys to the schema 'id'), then re-run."
            .to_string(),
    };
    let report_path = write_report(diagnostics_dir, &report);

    Err(RunError::MissingRequired {
        count: report.missing_required.len(),
        report: report_path,
    })
}

fn write_report(diagnostics_dir: &Path, report: &ValidationReport) -> PathBuf {
    let path = diagnostics_dir.join(REPORT_FILE);
    if let Err(err) = std::fs::create_dir_all(diagnostics_dir) {
        error!(dir = %diagnostics_dir.display(), %err, "cannot create diagnostics directory");
        return path;
    }
    match serde_json::to_string_pretty(report) {
        Ok(text) => {
            if let Err(err) = std::fs::write(&path, text + "\n") {
                error!(path = %path.display(), %err, "cannot write validation report");
            }
        }
        Err(err) => error!(%err, "cannot serialize validation report"),
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use issueform_core_types::FieldKind;

    fn required(id: &str, label: &str) -> FieldSchema {
        FieldSchema {
            id: id.to_string(),
            label: label.to_string(),
            kind: FieldKind::Textarea,
            options: Vec::new(),
            required: true,
        }
    }

    #[test]
    fn test_reports_exactly_the_missing_set() {
        let dir = tempfile::tempdir().unwrap();
        let schema = vec![
            required("bug_description", "Bug Description"),
            required("steps_to_reproduce", "Steps To Reproduce"),
            required("actual_behavior", "Actual Behavior"),
        ];
        let order = WorkOrder {
            bug_description: "it breaks".to_string(),
            ..WorkOrder::default()
        };

        // actual_behavior falls back to bug_description, so only the steps
        // are actually missing.
        let err = validate(&schema, &order, dir.path()).unwrap_err();
        match err {
            RunError::MissingRequired { count, report } => {
                assert_eq!(count, 1);
                let text = std::fs::read_to_string(report).unwrap();
                let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
                assert_eq!(parsed["ok"], false);
                assert_eq!(parsed["missing_required"].as_array().unwrap().len(), 1);
                assert_eq!(parsed["missing_required"][0]["id"], "steps_to_reproduce");
                assert_eq!(parsed["missing_required"][0]["label"], "Steps To Reproduce");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_complete_order_passes_without_report() {
        let dir = tempfile::tempdir().unwrap();
        let schema = vec![required("bug_description", "Bug Description")];
        let order = WorkOrder {
            bug_description: "it breaks".to_string(),
            ..WorkOrder::default()
        };
        validate(&schema, &order, dir.path()).unwrap();
        assert!(!dir.path().join(REPORT_FILE).exists());
    }
}
