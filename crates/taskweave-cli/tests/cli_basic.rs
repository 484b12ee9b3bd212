//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. Only
//! commands that touch no external service are exercised here.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "taskweave-cli", "--"])
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_help() {
    let (stdout, _, code) = run_cli(&["--help"]);
    assert_eq!(code, 0, "Help failed");
    assert!(stdout.contains("plan"));
    assert!(stdout.contains("slots"));
    assert!(stdout.contains("auth"));
    assert!(stdout.contains("config"));
}

#[test]
fn test_config_path() {
    let (stdout, _, code) = run_cli(&["config", "path"]);
    assert_eq!(code, 0, "Config path failed");
    assert!(stdout.contains("config.toml"));
}

#[test]
fn test_config_show() {
    let (stdout, _, code) = run_cli(&["config", "show"]);
    assert_eq!(code, 0, "Config show failed");
    assert!(stdout.contains("[working_hours]"));
    assert!(stdout.contains("[ollama]"));
}

#[test]
fn test_config_show_json() {
    let (stdout, _, code) = run_cli(&["config", "show", "--json"]);
    assert_eq!(code, 0, "Config show JSON failed");
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("config show --json must emit JSON");
    assert!(parsed["working_hours"]["start_hour"].is_number());
}

#[test]
fn test_unknown_command_fails() {
    let (_, _, code) = run_cli(&["frobnicate"]);
    assert_ne!(code, 0, "Unknown command should fail");
}
