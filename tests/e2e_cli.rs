//! CLI end-to-end tests
//!
//! Tests for the vetrina command-line interface.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the vetrina binary
#[allow(deprecated)]
fn vetrina_cmd() -> Command {
    Command::cargo_bin("vetrina").unwrap()
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = vetrina_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = vetrina_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("vetrina"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_flag() {
    let mut cmd = vetrina_cmd();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vetrina"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = vetrina_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_start_help() {
    let mut cmd = vetrina_cmd();
    cmd.args(["start", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Start the catalog API server"))
        .stdout(predicate::str::contains("--db"));
}

#[test]
fn test_cli_start_invalid_port() {
    let mut cmd = vetrina_cmd();
    cmd.args(["start", "--port", "99999"]).assert().failure();
}

#[test]
fn test_cli_validate_defaults() {
    let mut cmd = vetrina_cmd();
    cmd.arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("using defaults"))
        .stdout(predicate::str::contains("Page size: 50 (max 100)"));
}

#[test]
fn test_cli_validate_config_file() {
    let temp = tempdir().unwrap();
    let config_file = temp.path().join("config.json");
    fs::write(
        &config_file,
        r#"{
            "server": { "host": "127.0.0.1", "port": 9090 },
            "catalog": { "default_page_size": 20 }
        }"#,
    )
    .unwrap();

    let mut cmd = vetrina_cmd();
    cmd.args(["validate", config_file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("127.0.0.1:9090"))
        .stdout(predicate::str::contains("Page size: 20"));
}

#[test]
fn test_cli_validate_reports_warnings() {
    let temp = tempdir().unwrap();
    let config_file = temp.path().join("config.json");
    fs::write(&config_file, r#"{ "loader": { "page_size": 500 } }"#).unwrap();

    let mut cmd = vetrina_cmd();
    cmd.args(["--config", config_file.to_str().unwrap(), "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 warning(s)"))
        .stdout(predicate::str::contains("loader.page_size"));
}

#[test]
fn test_cli_validate_rejects_bad_json() {
    let temp = tempdir().unwrap();
    let config_file = temp.path().join("config.json");
    fs::write(&config_file, "{ not json").unwrap();

    let mut cmd = vetrina_cmd();
    cmd.args(["validate", config_file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}
