//! CLI integration tests

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Port 1 refuses connections, so the holiday lookup falls back at once
const DEAD_HOLIDAY_API: &str = "http://127.0.0.1:1/jiari/";

fn fanctl(dir: &Path, args: &[&str]) -> Output {
    fanctl_with_env(dir, args, &[])
}

fn fanctl_with_env(dir: &Path, args: &[&str], vars: &[(&str, &str)]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fanctl"))
        .args(args)
        .current_dir(dir)
        .env_clear()
        .env("FANCTL_HOLIDAY_API_URL", DEAD_HOLIDAY_API)
        .envs(vars.iter().copied())
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    let output = fanctl(dir.path(), &["--help"]);

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("auto"), "Should describe the target argument");
    assert!(stdout.contains("--config"), "Should show config option");
    assert!(stdout.contains("--log-format"), "Should show log format option");
    assert!(stdout.contains("--verify-tls"), "Should show TLS option");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let dir = TempDir::new().unwrap();
    let output = fanctl(dir.path(), &["--version"]);

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("fanctl"), "Should show binary name");
}

/// Out-of-range duty is rejected before anything runs
#[test]
fn test_out_of_range_target_rejected() {
    let dir = TempDir::new().unwrap();
    let output = fanctl(dir.path(), &["150"]);

    assert!(!output.status.success(), "150 should be rejected");
    assert_eq!(output.status.code(), Some(2));
    assert!(
        !dir.path().join("fan_control.log").exists(),
        "Nothing should be logged for a rejected argument"
    );
}

/// Non-numeric target is rejected
#[test]
fn test_garbage_target_rejected() {
    let dir = TempDir::new().unwrap();
    let output = fanctl(dir.path(), &["abc"]);

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "abc should be rejected");
    assert!(stderr.contains("abc"), "Should echo the bad value");
}

/// Explicit target with no hosts finishes cleanly and writes the log file
#[test]
fn test_auto_without_hosts() {
    let dir = TempDir::new().unwrap();
    let output = fanctl(dir.path(), &["AUTO"]);

    assert!(output.status.success(), "Empty host list is not an error");

    let log = std::fs::read_to_string(dir.path().join("fan_control.log")).unwrap();
    assert!(log.contains("No hosts configured"));
    assert!(log.contains("Holiday lookup failed"));
}

/// Log file is appended across runs
#[test]
fn test_log_file_is_appended() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("runs.log");
    std::fs::write(&log_path, "previous run\n").unwrap();

    let output = fanctl(
        dir.path(),
        &["55", "--log-file", log_path.to_str().unwrap(), "--config", "missing.json"],
    );

    assert!(output.status.success());
    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.starts_with("previous run\n"));
    assert!(log.contains("55%"));
}

/// JSON log lines carry the structured event name
#[test]
fn test_json_log_format() {
    let dir = TempDir::new().unwrap();
    let output = fanctl(dir.path(), &["40", "--log-format", "json"]);

    assert!(output.status.success());
    let log = std::fs::read_to_string(dir.path().join("fan_control.log")).unwrap();
    assert!(log.lines().all(|line| line.starts_with('{')));
    assert!(log.contains(r#""event":"run_finished""#));
}

/// A malformed FANCTL_* variable stops the run instead of reverting to defaults
#[test]
fn test_invalid_env_setting_is_fatal() {
    let dir = TempDir::new().unwrap();
    let output = fanctl_with_env(
        dir.path(),
        &["auto"],
        &[
            ("FANCTL_ACCEPT_INVALID_CERTS", "false"),
            ("FANCTL_HOLIDAY_TIMEOUT_SECS", "five"),
        ],
    );

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.contains("FANCTL_"), "Should name the settings source: {}", stderr);
    assert!(
        !dir.path().join("fan_control.log").exists(),
        "Nothing should run with unreadable settings"
    );
}
