//! End-to-end runs of the command line against temporary config files.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;

const DIRECTORY: &str = r#"
[[directory.entries]]
number = "+15551234567"
fallback = true
relay = "relay-west"
"#;

fn config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, contents).expect("should write config");
    path
}

fn run_json(config: &Path, args: &[&str]) -> Value {
    let output = Command::cargo_bin("courier")
        .expect("binary should build")
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("binary should run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn descriptor_for_push_only_destination_is_bounded() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = config(tmp.path(), "");

    let descriptor = run_json(&path, &["descriptor", "+15551234567"]);

    assert_eq!(descriptor["persistent"], true);
    assert_eq!(descriptor["group_key"], "+15551234567");
    assert_eq!(
        descriptor["preconditions"],
        serde_json::json!(["key_material", "network"])
    );
    assert_eq!(descriptor["retry_budget"]["bounded"], 5);
}

#[test]
fn descriptor_for_fallback_destination_is_unbounded() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = config(tmp.path(), DIRECTORY);

    let descriptor = run_json(&path, &["descriptor", "+15551234567"]);

    assert_eq!(descriptor["preconditions"], serde_json::json!(["key_material"]));
    assert_eq!(descriptor["retry_budget"], "unbounded");
}

#[test]
fn fallback_respects_preferences() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = config(
        tmp.path(),
        &format!("[fallback]\nallowed = true\nask_required = true\n{DIRECTORY}"),
    );

    let verdict = run_json(&path, &["fallback", "+1 (555) 123-4567"]);

    assert_eq!(verdict["canonical"], "+15551234567");
    assert_eq!(verdict["supported"], true);
    assert_eq!(verdict["approval_required"], true);
}

#[test]
fn address_carries_relay_hint() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = config(tmp.path(), DIRECTORY);

    let address = run_json(
        &path,
        &["address", "555-123-4567", "--recipient-id", "3"],
    );

    assert_eq!(address["recipient_id"], 3);
    assert_eq!(address["number"], "+15551234567");
    assert_eq!(address["device_id"], 1);
    assert_eq!(address["relay"], "relay-west");
}

#[test]
fn address_rejects_garbage() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = config(tmp.path(), "");

    Command::cargo_bin("courier")
        .expect("binary should build")
        .arg("--config")
        .arg(&path)
        .args(["address", "not-a-number"])
        .assert()
        .failure();
}

#[test]
fn locate_reports_exported_locator() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = config(tmp.path(), "");

    let report = run_json(
        &path,
        &["locate", "content://org.thoughtcrime.securesms/part/42"],
    );

    assert_eq!(report["local"], true);
    assert_eq!(report["kind"], "part");
    assert_eq!(report["id"], 42);
    assert_eq!(
        report["external"],
        "content://org.thoughtcrime.provider.securesms/part/42"
    );
}

#[test]
fn fetch_refuses_local_references() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = config(tmp.path(), "");

    Command::cargo_bin("courier")
        .expect("binary should build")
        .arg("--config")
        .arg(&path)
        .args(["fetch", "content://org.thoughtcrime.securesms/thumb/1"])
        .assert()
        .failure();
}

#[test]
fn fetch_copies_local_files() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = config(tmp.path(), "");
    let source = tmp.path().join("photo.jpg");
    std::fs::write(&source, b"0123456789").expect("should write fixture");
    let target = tmp.path().join("copy.jpg");
    let url = url::Url::from_file_path(&source).expect("absolute path");

    Command::cargo_bin("courier")
        .expect("binary should build")
        .arg("--config")
        .arg(&path)
        .args(["fetch", url.as_str(), "--out"])
        .arg(&target)
        .assert()
        .success()
        .stdout("10\n");

    assert_eq!(
        std::fs::read(&target).expect("copy should exist"),
        b"0123456789"
    );
}
