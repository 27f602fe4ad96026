//! Issue Forms schema loading.
//!
//! The two form templates ship embedded in the binary so a run never
//! depends on a checkout layout; `--templates-dir` swaps in on-disk copies
//! for testing against a modified form.

use std::path::Path;

use serde::Deserialize;

use issueform_core_types::{FieldKind, FieldSchema, IssueType};

use crate::errors::RunError;

const BUG_TEMPLATE: &str = include_str!("../assets/templates/bug_report.yml");
const FEATURE_TEMPLATE: &str = include_str!("../assets/templates/feature_request.yml");

#[derive(Deserialize)]
struct TemplateDoc {
    #[serde(default)]
    body: Vec<BodyItem>,
}

#[derive(Deserialize)]
struct BodyItem {
    id: Option<String>,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    attributes: Attributes,
    #[serde(default)]
    validations: Validations,
}

#[derive(Deserialize, Default)]
struct Attributes {
    #[serde(default)]
    label: String,
    #[serde(default)]
    options: Vec<serde_yaml::Value>,
}

#[derive(Deserialize, Default)]
struct Validations {
    #[serde(default)]
    required: bool,
}

/// Load the field schema for an issue type.
pub fn load(issue_type: IssueType, templates_dir: Option<&Path>) -> Result<Vec<FieldSchema>, RunError> {
    let text = match templates_dir {
        Some(dir) => {
            let path = dir.join(issue_type.template_file());
            std::fs::read_to_string(&path).map_err(|e| {
                RunError::Schema(format!("cannot read {}: {e}", path.display()))
            })?
        }
        None => embedded(issue_type).to_string(),
    };
    parse(&text)
}

fn embedded(issue_type: IssueType) -> &'static str {
    match issue_type {
        IssueType::Bug => BUG_TEMPLATE,
        IssueType::Feature => FEATURE_TEMPLATE,
    }
}

/// Parse an Issue Forms document. Only body entries carrying an `id` are
/// schema fields; everything else (markdown blocks and the like) is
/// display-only.
pub fn parse(text: &str) -> Result<Vec<FieldSchema>, RunError> {
    let doc: TemplateDoc =
        serde_yaml::from_str(text).map_err(|e| RunError::Schema(e.to_string()))?;
    Ok(doc
        .body
        .into_iter()
        .filter_map(|item| {
            let id = item.id?;
            Some(FieldSchema {
                id,
                label: item.attributes.label.trim().to_string(),
                kind: FieldKind::from_schema_type(&item.kind),
                options: item
                    .attributes
                    .options
                    .iter()
                    .filter_map(option_text)
                    .collect(),
                required: item.validations.required,
            })
        })
        .collect())
}

/// Dropdown options are plain strings; checkbox-style options are maps
/// with a `label`.
fn option_text(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Mapping(map) => map
            .get("label")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        _ => None,
    }
}
