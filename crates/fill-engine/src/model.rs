//! Engine result types.

use serde::Serialize;

use issueform_core_types::FieldKind;

/// A required field whose control could not be resolved or filled.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MissingField {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
}

/// What a run produced.
#[derive(Clone, Debug, PartialEq)]
pub enum FillOutcome {
    /// The create action was confirmed through the created-resource URL.
    Submitted {
        issue_url: String,
        issue_number: String,
    },
    /// The form was filled but the create action was never clicked.
    DryRun,
}
