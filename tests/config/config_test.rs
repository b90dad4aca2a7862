//! Config file loading.

use std::path::Path;

use courier::address::DirectoryEntry;
use courier::config::{load_config, load_or_default};
use courier::policy::Preferences;

fn write(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, contents).expect("should write config");
    path
}

#[test]
fn full_config_parses() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = write(
        tmp.path(),
        r#"
[fallback]
allowed = true
ask_required = true

[address]
local_country_code = "44"

[events]
capacity = 8

[logging]
logs_dir = "/var/log/courier"

[[directory.entries]]
number = "+447700900123"
fallback = true
relay = "relay-eu"

[[directory.entries]]
number = "+447700900456"
"#,
    );

    let config = load_config(&path).expect("config should parse");
    assert!(config.fallback.fallback_allowed());
    assert!(config.fallback.fallback_approval_required());
    assert_eq!(config.address.local_country_code, "44");
    assert_eq!(config.events.capacity, 8);
    assert_eq!(
        config.logging.logs_dir.as_deref(),
        Some(Path::new("/var/log/courier"))
    );
    assert_eq!(config.directory.entries.len(), 2);
    assert_eq!(
        config.directory.entries[0],
        DirectoryEntry {
            number: "+447700900123".to_owned(),
            fallback: true,
            relay: Some("relay-eu".to_owned()),
        }
    );
    assert!(!config.directory.entries[1].fallback);
    assert_eq!(config.directory.entries[1].relay, None);
}

#[test]
fn empty_file_uses_defaults() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = write(tmp.path(), "");
    let config = load_config(&path).expect("config should parse");
    assert!(config.fallback.allowed);
    assert!(!config.fallback.ask_required);
    assert_eq!(config.address.local_country_code, "1");
    assert_eq!(config.events.capacity, 64);
    assert!(config.directory.entries.is_empty());
    assert!(config.logging.logs_dir.is_none());
}

#[test]
fn missing_file_is_an_error_for_load_config() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let err = load_config(&tmp.path().join("absent.toml")).expect_err("should fail");
    assert!(err.to_string().contains("failed to read config"));
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let config = load_or_default(&tmp.path().join("absent.toml")).expect("defaults");
    assert!(config.fallback.allowed);
}

#[test]
fn malformed_file_is_rejected() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = write(tmp.path(), "[fallback\nallowed = ");
    let err = load_or_default(&path).expect_err("should fail");
    assert!(err.to_string().contains("failed to parse config"));
}
