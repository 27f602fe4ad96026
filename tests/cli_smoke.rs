//! End-to-end exit-code behavior of the binary, for the paths that never
//! touch a browser.

use assert_cmd::prelude::*;
use serde_json::json;
use std::process::Command;

fn issueform() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("issueform"))
}

#[test]
fn no_work_order_path_exits_two() {
    let assert = issueform().assert().code(2);
    let stderr = String::from_utf8(assert.get_output().stderr.clone()).expect("utf8 output");
    assert!(stderr.contains("--work-order"), "hint missing: {stderr}");
}

#[test]
fn nonexistent_work_order_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    issueform()
        .arg("--work-order")
        .arg(dir.path().join("missing.json"))
        .assert()
        .code(2);
}

#[test]
fn recorded_issue_exits_zero_and_prints_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("work_order.json");
    std::fs::write(
        &path,
        serde_json::to_string_pretty(&json!({
            "issue_number": "42",
            "issue_url": "https://github.com/iOfficeAI/AionUi/issues/42",
        }))
        .unwrap(),
    )
    .unwrap();

    let assert = issueform()
        .arg("--work-order")
        .arg(&path)
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 output");
    assert!(stdout.contains("#42"), "missing identifier: {stdout}");
}

#[test]
fn incomplete_work_order_exits_two_with_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("work_order.json");
    std::fs::write(
        &path,
        serde_json::to_string_pretty(&json!({"title": "crash on save"})).unwrap(),
    )
    .unwrap();

    issueform()
        .arg("--work-order")
        .arg(&path)
        .assert()
        .code(2);

    assert!(dir
        .path()
        .join("artifacts")
        .join("work_order_validation_report.json")
        .exists());
}
