//! Integration tests for the ctxlog binary.
//!
//! These tests verify end-to-end behavior including:
//! - Construction failures and their exit status
//! - Level defaults by environment
//! - Context fields on emitted records
//! - Fatal records ending the process

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

/// Helper to create an isolated config directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the CLI binary with a clean environment
fn cli(config_home: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ctxlog"));
    cmd.env_clear().env("XDG_CONFIG_HOME", config_home.path());
    cmd
}

fn parse_lines(output: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(output)
        .lines()
        .map(|line| serde_json::from_str(line).expect("record is not JSON"))
        .collect()
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Structured logging with host-derived context",
        ));
}

#[test]
fn test_missing_environment_fails() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .args(["emit", "info", "hello", "--output", "stdout"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("environment must be set"));
}

#[test]
fn test_dev_debug_record_emitted() {
    let temp_dir = setup_test_dir();
    let output = cli(&temp_dir)
        .args(["emit", "debug", "starting", "port=8080"])
        .args(["--env", "dev", "--output", "stdout"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let lines = parse_lines(&output);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["level"], "debug");
    assert_eq!(lines[0]["msg"], "starting");
    assert_eq!(lines[0]["port"], 8080);
    assert_eq!(lines[0]["env"], "dev");
}

#[test]
fn test_production_debug_suppressed() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .args(["emit", "debug", "detail"])
        .args(["--env", "production", "--output", "stdout"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_context_from_environment_variables() {
    let temp_dir = setup_test_dir();
    let output = cli(&temp_dir)
        .env("APP_NAME", "billing")
        .env("APP_ENV", "staging")
        .env("APP_REVISION", "4f2a9c1")
        .env("APP_HOSTNAME", "edge-7")
        .env("APP_PID", "512")
        .env("LOG_OUTPUT", "stdout")
        .args(["emit", "warn", "slow query", "ms=1250", "cached=false"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let lines = parse_lines(&output);
    assert_eq!(lines.len(), 1);
    let record = &lines[0];
    assert_eq!(record["app_name"], "billing");
    assert_eq!(record["hostname"], "edge-7");
    assert_eq!(record["version"], "4f2a9c1");
    assert_eq!(record["env"], "staging");
    assert_eq!(record["PID"], 512);
    assert_eq!(record["ms"], 1250);
    assert_eq!(record["cached"], false);
}

#[test]
fn test_resolve_production_defaults() {
    let temp_dir = setup_test_dir();
    let output = cli(&temp_dir)
        .args(["resolve", "--env", "production"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let resolved: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(resolved["log_level"], "info");
    assert!(!resolved["hostname"].as_str().unwrap().is_empty());
    assert!(resolved["process_id"].as_u64().unwrap() > 0);
    assert_eq!(resolved["output"], "stderr");
}

#[test]
fn test_explicit_level_overrides_environment() {
    let temp_dir = setup_test_dir();
    let output = cli(&temp_dir)
        .args(["resolve", "--env", "production", "--level", "debug"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let resolved: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(resolved["log_level"], "debug");
}

#[test]
fn test_config_file_with_flag_override() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("logger.toml");
    fs::write(
        &config_path,
        r#"
app_name = "from-file"
environment = "production"
revision = "r1"
"#,
    )
    .unwrap();

    let output = cli(&temp_dir)
        .arg("--config")
        .arg(&config_path)
        .args(["--app-name", "from-flag", "--output", "stdout"])
        .args(["emit", "info", "configured"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let lines = parse_lines(&output);
    assert_eq!(lines[0]["app_name"], "from-flag");
    assert_eq!(lines[0]["version"], "r1");
    assert_eq!(lines[0]["env"], "production");
}

#[test]
fn test_default_config_path_is_read() {
    let temp_dir = setup_test_dir();
    let config_dir = temp_dir.path().join("ctxlog");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "environment = \"qa\"\noutput = \"stdout\"\n",
    )
    .unwrap();

    let output = cli(&temp_dir)
        .args(["emit", "debug", "picked up"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let lines = parse_lines(&output);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["env"], "qa");
}

#[test]
fn test_file_output_appends_records() {
    let temp_dir = setup_test_dir();
    let log_path = temp_dir.path().join("app.jsonl");

    for message in ["first", "second"] {
        cli(&temp_dir)
            .args(["emit", "info", message, "--env", "dev"])
            .arg("--output")
            .arg(&log_path)
            .assert()
            .success();
    }

    let contents = fs::read_to_string(&log_path).unwrap();
    let lines = parse_lines(contents.as_bytes());
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["msg"], "first");
    assert_eq!(lines[1]["msg"], "second");
}

#[test]
fn test_unwritable_output_fails_construction() {
    let temp_dir = setup_test_dir();
    let log_path = temp_dir.path().join("missing").join("app.jsonl");

    cli(&temp_dir)
        .args(["emit", "info", "lost", "--env", "dev"])
        .arg("--output")
        .arg(&log_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Engine"));
}

#[test]
fn test_fatal_emits_then_exits() {
    let temp_dir = setup_test_dir();
    let assert = cli(&temp_dir)
        .args(["emit", "fatal", "cannot continue", "code=42"])
        .args(["--env", "production", "--output", "stdout"])
        .assert()
        .code(1);

    let lines = parse_lines(&assert.get_output().stdout);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["level"], "fatal");
    assert_eq!(lines[0]["msg"], "cannot continue");
    assert_eq!(lines[0]["code"], 42);
}

#[test]
fn test_error_does_not_exit_early() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .args(["emit", "error", "recoverable"])
        .args(["--env", "production", "--output", "stdout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"level\":\"error\""));
}

#[test]
fn test_malformed_field_rejected() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .args(["emit", "info", "hello", "novalue", "--env", "dev"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected key=value"));
}

#[test]
fn test_tracing_engine_writes_to_stderr() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .args(["emit", "info", "via tracing", "user=ada"])
        .args(["--env", "dev", "--engine", "tracing"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("via tracing"))
        .stderr(predicate::str::contains("app_name"));
}

#[test]
fn test_level_flag_sets_minimum() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .args(["--level", "error", "emit", "info", "quiet"])
        .args(["--env", "dev", "--output", "stdout"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let output = cli(&temp_dir)
        .args(["--level", "error", "emit", "error", "loud"])
        .args(["--env", "dev", "--output", "stdout"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let lines = parse_lines(&output);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["msg"], "loud");
}

#[test]
fn test_log_level_variable_sets_minimum() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .env("LOG_LEVEL", "error")
        .args(["emit", "warn", "quiet", "--env", "dev", "--output", "stdout"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_tracing_engine_ignores_restrictive_rust_log() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .env("RUST_LOG", "warn")
        .args(["emit", "info", "via tracing", "--env", "dev", "--engine", "tracing"])
        .assert()
        .success()
        .stderr(predicate::str::contains("via tracing"));
}

#[test]
fn test_tracing_engine_fatal_with_rust_log_off() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .env("RUST_LOG", "off")
        .args(["emit", "fatal", "dying", "--env", "dev", "--engine", "tracing"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("dying"));
}

#[test]
fn test_tracing_engine_rejects_file_output() {
    let temp_dir = setup_test_dir();
    let log_path = temp_dir.path().join("missing").join("app.jsonl");

    cli(&temp_dir)
        .args(["emit", "info", "lost", "--env", "dev", "--engine", "tracing"])
        .arg("--output")
        .arg(&log_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires the json engine"));
}

#[test]
fn test_non_finite_and_zero_padded_fields_survive() {
    let temp_dir = setup_test_dir();
    let output = cli(&temp_dir)
        .args(["emit", "info", "odd values", "ratio=nan", "zip=01234"])
        .args(["--env", "dev", "--output", "stdout"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let lines = parse_lines(&output);
    assert_eq!(lines[0]["ratio"], "nan");
    assert_eq!(lines[0]["zip"], "01234");
}
