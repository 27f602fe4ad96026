//! Idempotency guard.
//!
//! Submission is one-shot per work order: once the record carries an issue
//! identifier, re-runs print it and exit instead of opening a browser. The
//! success write-back here is the only thing standing between a re-run and
//! a duplicate issue.

use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::work_order;

/// Identifiers of an already-submitted issue.
#[derive(Clone, Debug, PartialEq)]
pub struct ExistingIssue {
    pub number: Option<String>,
    pub url: Option<String>,
}

/// Persisted identifiers, when either is present and non-empty. Older
/// records stored the number as a JSON number; both spellings count.
pub fn existing_issue(raw: &Map<String, Value>) -> Option<ExistingIssue> {
    let read = |key: &str| {
        let text = match raw.get(key)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    };
    let number = read("issue_number");
    let url = read("issue_url");
    if number.is_none() && url.is_none() {
        return None;
    }
    Some(ExistingIssue { number, url })
}

/// Write the issue identifiers back into the work-order file.
///
/// Fresh read-modify-write against the file on disk, so edits made while
/// the browser stage ran are not clobbered.
pub fn record_success(path: &Path, issue_url: &str, issue_number: &str) -> std::io::Result<()> {
    let text = std::fs::read_to_string(path)?;
    let mut raw: Map<String, Value> = match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    raw.insert(
        "issue_url".to_string(),
        Value::String(issue_url.to_string()),
    );
    raw.insert(
        "issue_number".to_string(),
        Value::String(issue_number.to_string()),
    );
    work_order::persist(path, &raw)?;
    debug!(issue_number, "issue identifiers recorded");
    Ok(())
}
