//! Shared types for the issueform workspace.
//!
//! Everything here is pure data: field schemas parsed from Issue Forms
//! documents, the normalized work order, and the per-run field payloads the
//! fill engine consumes. No I/O beyond serde derives.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The one repository this tool submits to.
pub const SUPPORTED_REPO: &str = "iOfficeAI/AionUi";

/// Project home, used as the base for the issue-form URL.
pub const PROJECT_URL: &str = "https://github.com/iOfficeAI/AionUi";

/// Shared error type for schema and work-order handling.
#[derive(Debug, Error, Clone)]
pub enum FormError {
    #[error("unsupported target repository '{0}' (only {SUPPORTED_REPO} is supported)")]
    UnsupportedRepo(String),

    #[error("work order: {0}")]
    WorkOrder(String),

    #[error("field schema: {0}")]
    Schema(String),
}

/// Which issue form a work order targets.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    #[default]
    Bug,
    Feature,
}

impl IssueType {
    /// Template file name under the repository's issue-template directory.
    pub fn template_file(self) -> &'static str {
        match self {
            IssueType::Bug => "bug_report.yml",
            IssueType::Feature => "feature_request.yml",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IssueType::Bug => "bug",
            IssueType::Feature => "feature",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// New-issue form URL for a project and issue type.
pub fn form_url(project_url: &str, issue_type: IssueType) -> String {
    format!(
        "{}/issues/new?template={}",
        project_url.trim_end_matches('/'),
        issue_type.template_file()
    )
}

/// Control type of a schema field, which selects the interaction protocol.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Single-line text input.
    Input,
    /// Multi-line text area.
    Textarea,
    /// Composite dropdown widget with a fixed option list.
    Dropdown,
    /// Anything else; treated as text-like by the applier.
    Other,
}

impl FieldKind {
    /// Map an Issue Forms `type` string onto a kind. Unknown strings fall
    /// back to [`FieldKind::Other`] rather than failing.
    pub fn from_schema_type(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "input" => FieldKind::Input,
            "textarea" => FieldKind::Textarea,
            "dropdown" => FieldKind::Dropdown,
            _ => FieldKind::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Input => "input",
            FieldKind::Textarea => "textarea",
            FieldKind::Dropdown => "dropdown",
            FieldKind::Other => "other",
        }
    }
}

/// One declared form field. Immutable once loaded from the schema document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Stable key, unique within the schema.
    pub id: String,
    /// Display text; the resolver locates the control through this.
    pub label: String,
    pub kind: FieldKind,
    /// Non-empty only for dropdowns, in declared order.
    pub options: Vec<String>,
    pub required: bool,
}

/// The resolved (schema, value) pair handed to the value applier.
/// Derived each run, never persisted.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldPayload {
    pub id: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub options: Vec<String>,
    pub value: String,
}

impl FieldPayload {
    pub fn new(schema: &FieldSchema, value: impl Into<String>) -> Self {
        Self {
            id: schema.id.clone(),
            label: schema.label.clone(),
            kind: schema.kind,
            required: schema.required,
            options: schema.options.clone(),
            value: value.into(),
        }
    }
}

/// Pick a selectable option for a dropdown.
///
/// A case-insensitive exact member match wins and returns the canonical
/// option spelling; an empty or non-member value falls back to the first
/// option. Returns `None` only when `options` itself is empty.
pub fn pick_option(value: &str, options: &[String]) -> Option<String> {
    if options.is_empty() {
        return None;
    }
    let wanted = value.trim();
    if !wanted.is_empty() {
        if let Some(hit) = options
            .iter()
            .find(|o| o.eq_ignore_ascii_case(wanted))
        {
            return Some(hit.clone());
        }
    }
    Some(options[0].clone())
}

/// Normalized submission intent.
///
/// Field values are stored under their canonical schema ids; the struct is
/// mutated only to bake in inferred defaults and, after a confirmed
/// submission, the issue identifiers.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct WorkOrder {
    pub owner_repo: String,
    pub project_url: String,
    pub issue_type: IssueType,
    pub title: String,

    // Bug form ids.
    pub platform: String,
    pub version: String,
    pub bug_description: String,
    pub steps_to_reproduce: String,
    pub expected_behavior: String,
    pub actual_behavior: String,
    pub additional_context: String,

    // Feature form ids.
    pub feature_description: String,
    pub problem_statement: String,
    pub proposed_solution: String,
    pub feature_category: String,

    pub attachments: Vec<String>,

    /// Present only after a confirmed submission, always together with
    /// `issue_url`.
    pub issue_number: Option<String>,
    pub issue_url: Option<String>,
}

impl WorkOrder {
    /// Raw value stored under a canonical field id.
    pub fn value_for(&self, field_id: &str) -> &str {
        match field_id {
            "platform" => &self.platform,
            "version" => &self.version,
            "bug_description" => &self.bug_description,
            "steps_to_reproduce" => &self.steps_to_reproduce,
            "expected_behavior" => &self.expected_behavior,
            "actual_behavior" => &self.actual_behavior,
            "additional_context" => &self.additional_context,
            "feature_description" => &self.feature_description,
            "problem_statement" => &self.problem_statement,
            "proposed_solution" => &self.proposed_solution,
            "feature_category" => &self.feature_category,
            _ => "",
        }
    }

    /// Value for a field id with the standing fallbacks applied:
    /// `actual_behavior` borrows from `bug_description`, `version` defaults
    /// to "latest". `platform` is resolved at normalization time and is
    /// returned as stored.
    pub fn effective_value(&self, field_id: &str) -> String {
        let raw = self.value_for(field_id).trim();
        match field_id {
            "actual_behavior" if raw.is_empty() => self.bug_description.trim().to_string(),
            "version" if raw.is_empty() => "latest".to_string(),
            _ => raw.to_string(),
        }
    }

    pub fn form_url(&self) -> String {
        form_url(&self.project_url, self.issue_type)
    }
}

/// Extract the issue number from a created-issue URL.
///
/// The created-resource shape is a path ending in `issues/<number>`; query
/// strings, fragments and a trailing slash are tolerated. This is the only
/// submission-success oracle.
pub fn created_issue_number(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .collect();
    match segments.as_slice() {
        [.., section, number]
            if *section == "issues"
                && !number.is_empty()
                && number.bytes().all(|b| b.is_ascii_digit()) =>
        {
            Some((*number).to_string())
        }
        _ => None,
    }
}
