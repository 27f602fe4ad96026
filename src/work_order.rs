//! Work-order normalization and persistence.
//!
//! Normalization maps a loosely-shaped JSON record onto the canonical
//! schema-aligned keys, accepting the legacy key spellings older tooling
//! still emits. It is total: malformed input coerces toward defaults and
//! never errors. Persistence is read-modify-write so keys this tool does
//! not know about survive untouched.

use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use issueform_core_types::{
    pick_option, FieldKind, FieldPayload, FieldSchema, IssueType, WorkOrder, PROJECT_URL,
    SUPPORTED_REPO,
};

use crate::errors::RunError;

/// Read the raw work-order object from disk.
pub fn read_raw(path: &Path) -> Result<Map<String, Value>, RunError> {
    let text = std::fs::read_to_string(path).map_err(|_| RunError::WorkOrderNotFound {
        path: path.to_path_buf(),
    })?;
    let value: Value =
        serde_json::from_str(&text).map_err(|source| RunError::WorkOrderParse {
            path: path.to_path_buf(),
            source,
        })?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// Normalize a raw record into a [`WorkOrder`]. Pure and total.
pub fn normalize(raw: &Map<String, Value>) -> WorkOrder {
    let issue_type = infer_issue_type(raw);

    let bug_description = first_string(raw, &["bug_description", "description"]);
    let expected_behavior = first_string(raw, &["expected_behavior", "expected"]);
    let actual_behavior = {
        let explicit = first_string(raw, &["actual_behavior"]);
        if explicit.trim().is_empty() {
            bug_description.clone()
        } else {
            explicit
        }
    };

    let platform = {
        let given = first_string(raw, &["platform"]);
        let trimmed = given.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto")
            || trimmed.eq_ignore_ascii_case("detect")
        {
            host_platform().to_string()
        } else {
            given
        }
    };

    let version = {
        let given = first_string(raw, &["version"]);
        if given.trim().is_empty() {
            "latest".to_string()
        } else {
            given
        }
    };

    let proposed_solution = {
        let given = first_string(raw, &["proposed_solution", "solution"]);
        if given.trim().is_empty() {
            expected_behavior.clone()
        } else {
            given
        }
    };

    WorkOrder {
        owner_repo: non_empty_or(first_string(raw, &["owner_repo"]), SUPPORTED_REPO),
        project_url: non_empty_or(first_string(raw, &["project_url"]), PROJECT_URL),
        issue_type,
        title: first_string(raw, &["title"]).trim().to_string(),
        platform,
        version,
        bug_description: bug_description.clone(),
        steps_to_reproduce: joined_string(raw, &["steps_to_reproduce", "steps"]),
        expected_behavior,
        actual_behavior,
        additional_context: first_string(raw, &["additional_context"]),
        feature_description: first_string(raw, &["feature_description", "description"]),
        problem_statement: first_string(raw, &["problem_statement", "problem"]),
        proposed_solution,
        feature_category: first_string(raw, &["feature_category", "category"]),
        attachments: string_list(raw.get("attachments")),
        issue_number: non_empty(first_string(raw, &["issue_number"])),
        issue_url: non_empty(first_string(raw, &["issue_url"])),
    }
}

/// Issue type from the explicit field, else from a legacy `template`
/// string, else bug.
fn infer_issue_type(raw: &Map<String, Value>) -> IssueType {
    let explicit = first_string(raw, &["issue_type"]).to_lowercase();
    if explicit.starts_with("feat") {
        return IssueType::Feature;
    }
    if !explicit.is_empty() {
        return IssueType::Bug;
    }
    let template = first_string(raw, &["template"]).to_lowercase();
    if template.contains("feature") {
        IssueType::Feature
    } else {
        IssueType::Bug
    }
}

/// Host platform in the spelling the form's dropdown uses. On macOS the
/// reported CPU architecture separates Apple Silicon from Intel.
pub fn host_platform() -> &'static str {
    match std::env::consts::OS {
        "windows" => "Windows",
        "linux" => "Linux",
        "macos" => {
            if std::env::consts::ARCH == "aarch64" {
                "macOS (Apple Silicon)"
            } else {
                "macOS (Intel)"
            }
        }
        _ => "Windows",
    }
}

/// Derive the per-run payloads in schema order. Dropdown values are
/// coerced into the declared option list here, before the engine ever
/// sees them.
pub fn build_payloads(schema: &[FieldSchema], order: &WorkOrder) -> Vec<FieldPayload> {
    schema
        .iter()
        .map(|field| {
            let mut value = order.effective_value(&field.id);
            if field.kind == FieldKind::Dropdown {
                if let Some(option) = pick_option(&value, &field.options) {
                    value = option;
                }
            }
            FieldPayload::new(field, value)
        })
        .collect()
}

/// Bake the normalized values back into the raw record, preserving any
/// keys normalization does not know about.
pub fn apply_to_raw(order: &WorkOrder, raw: &mut Map<String, Value>) {
    let mut set = |key: &str, value: &str| {
        raw.insert(key.to_string(), Value::String(value.to_string()));
    };
    set("issue_type", order.issue_type.as_str());
    set("title", &order.title);
    set("platform", &order.platform);
    set("version", &order.version);
    set("bug_description", &order.bug_description);
    set("steps_to_reproduce", &order.steps_to_reproduce);
    set("expected_behavior", &order.expected_behavior);
    set("actual_behavior", &order.actual_behavior);
    set("additional_context", &order.additional_context);
    set("feature_description", &order.feature_description);
    set("problem_statement", &order.problem_statement);
    set("proposed_solution", &order.proposed_solution);
    set("feature_category", &order.feature_category);
    raw.insert(
        "attachments".to_string(),
        Value::Array(
            order
                .attachments
                .iter()
                .map(|a| Value::String(a.clone()))
                .collect(),
        ),
    );
}

/// Write the record back to disk, pretty-printed.
pub fn persist(path: &Path, raw: &Map<String, Value>) -> std::io::Result<()> {
    let text = serde_json::to_string_pretty(&Value::Object(raw.clone()))
        .expect("JSON maps always serialize");
    std::fs::write(path, text + "\n")?;
    debug!(path = %path.display(), "work order written back");
    Ok(())
}

fn first_string(raw: &Map<String, Value>, keys: &[&str]) -> String {
    for key in keys {
        if let Some(value) = raw.get(*key) {
            let text = scalar_string(value);
            if !text.is_empty() {
                return text;
            }
        }
    }
    String::new()
}

/// String or sequence-of-strings, joined with newlines.
fn joined_string(raw: &Map<String, Value>, keys: &[&str]) -> String {
    for key in keys {
        match raw.get(*key) {
            Some(Value::Array(items)) => {
                let lines: Vec<String> = items.iter().map(scalar_string).collect();
                let joined = lines.join("\n");
                if !joined.trim().is_empty() {
                    return joined;
                }
            }
            Some(other) => {
                let text = scalar_string(other);
                if !text.is_empty() {
                    return text;
                }
            }
            None => {}
        }
    }
    String::new()
}

/// Coerce a scalar to text; containers and null coerce to empty.
fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(scalar_string)
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn non_empty_or(value: String, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value
    }
}
