//! End-to-end tests for the cascade-timer binary.
//!
//! These tests run the compiled binary:
//! - Help, version and shell completions
//! - Validating timer files against the host limits
//! - Running short sequences to their alarms

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

fn cmd() -> Command {
    Command::cargo_bin("cascade-timer").unwrap()
}

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Writes a config file so tests never read the user's real config.
fn isolated_config(dir: &Path, content: &str) -> PathBuf {
    write_file(dir, "config.json", content)
}

// ============================================================================
// Help / Completions
// ============================================================================

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cascade-timer"));
}

#[test]
fn completions_for_bash() {
    cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cascade-timer"));
}

#[test]
fn invalid_timer_argument_is_rejected() {
    cmd()
        .args(["run", "-t", "10:20"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("10:20"));
}

// ============================================================================
// Validate
// ============================================================================

#[test]
fn validate_accepts_well_formed_file() {
    let dir = TempDir::new().unwrap();
    let config = isolated_config(dir.path(), "{}");
    let file = write_file(
        dir.path(),
        "timers.json",
        r#"[
            [{"starting_time": 90, "warning_time": 30, "final_time": 10}, {"starting_time": 0}],
            [{"starting_time": 45}]
        ]"#,
    );

    cmd()
        .arg("--config")
        .arg(&config)
        .arg("validate")
        .arg("--file")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("グループ 2"))
        .stdout(predicate::str::contains("1:30 (警告 0:30 / 最終 0:10)"))
        .stdout(predicate::str::contains("未設定"))
        .stdout(predicate::str::contains("有効です"));
}

#[test]
fn validate_rejects_invalid_thresholds() {
    let dir = TempDir::new().unwrap();
    let config = isolated_config(dir.path(), "{}");
    let file = write_file(
        dir.path(),
        "timers.json",
        r#"[[{"starting_time": 10, "warning_time": 5, "final_time": 8}]]"#,
    );

    cmd()
        .arg("--config")
        .arg(&config)
        .args(["validate", "-f"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("エラー"));
}

#[test]
fn validate_enforces_group_capacity() {
    let dir = TempDir::new().unwrap();
    let config = isolated_config(dir.path(), r#"{"group_capacity": 1}"#);
    let file = write_file(
        dir.path(),
        "timers.json",
        r#"[[{"starting_time": 10}, {"starting_time": 20}]]"#,
    );

    cmd()
        .arg("--config")
        .arg(&config)
        .args(["validate", "-f"])
        .arg(&file)
        .assert()
        .failure();
}

#[test]
fn validate_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let config = isolated_config(dir.path(), "{}");

    cmd()
        .arg("--config")
        .arg(&config)
        .args(["validate", "-f"])
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure();
}

#[test]
fn broken_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let config = isolated_config(dir.path(), "{not json");

    cmd()
        .arg("--config")
        .arg(&config)
        .args(["run", "-t", "1"])
        .assert()
        .failure();
}

// ============================================================================
// Run
// ============================================================================

#[test]
fn run_single_timer_to_alarm() {
    let dir = TempDir::new().unwrap();
    let config = isolated_config(dir.path(), r#"{"poll_interval_ms": 50}"#);

    cmd()
        .arg("--config")
        .arg(&config)
        .args(["run", "-t", "1"])
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .success()
        .stdout(predicate::str::contains("アラーム"))
        .stdout(predicate::str::contains("終了しました"));
}

#[test]
fn run_cascades_through_sequence() {
    let dir = TempDir::new().unwrap();
    let config = isolated_config(dir.path(), "{}");

    cmd()
        .arg("--config")
        .arg(&config)
        .args(["run", "-t", "1", "-t", "0", "-t", "1", "--auto-cascade", "--poll-ms", "50"])
        .timeout(std::time::Duration::from_secs(15))
        .assert()
        .success()
        .stdout(predicate::str::contains("!!").count(2))
        .stdout(predicate::str::contains("終了しました"));
}

#[test]
fn run_without_timers_fails() {
    let dir = TempDir::new().unwrap();
    let config = isolated_config(dir.path(), "{}");

    cmd()
        .arg("--config")
        .arg(&config)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("タイマー"));
}

#[test]
fn run_with_only_unconfigured_timers_fails() {
    let dir = TempDir::new().unwrap();
    let config = isolated_config(dir.path(), "{}");

    cmd()
        .arg("--config")
        .arg(&config)
        .args(["run", "-t", "0", "-t", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("開始時間"));
}
