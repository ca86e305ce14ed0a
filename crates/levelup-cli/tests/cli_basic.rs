//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    run_cli_at(data_dir, None, args)
}

/// Like [`run_cli`], with the clock pinned to an RFC 3339 instant.
fn run_cli_at(data_dir: &Path, now: Option<&str>, args: &[&str]) -> (String, String, i32) {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_levelup"));
    cmd.env("LEVELUP_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .env_remove("LEVELUP_NOW")
        .args(args);
    if let Some(now) = now {
        cmd.env("LEVELUP_NOW", now);
    }
    let output = cmd.output().expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn parse_json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_level_for_points() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["level", "--points", "225"]);
    assert_eq!(code, 0);
    let info = parse_json(&stdout);
    assert_eq!(info["level"], 3);
    assert_eq!(info["bonus_multiplier"], 1.05);
}

#[test]
fn test_negative_points_clamp_to_level_one() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["level", "--points", "-40"]);
    assert_eq!(code, 0);
    assert_eq!(parse_json(&stdout)["level"], 1);
}

#[test]
fn test_award_then_show_level() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["points", "award", "150", "--user", "ana"]);
    assert_eq!(code, 0);

    let (stdout, _, code) = run_cli(dir.path(), &["level", "--user", "ana"]);
    assert_eq!(code, 0);
    assert_eq!(parse_json(&stdout)["level"], 2);

    let (stdout, _, code) = run_cli(dir.path(), &["points", "show", "--user", "other"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "0");
}

#[test]
fn test_points_reset_reports_regression() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["points", "award", "80"]);
    let (stdout, stderr, code) = run_cli(dir.path(), &["points", "reset"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "0");
    assert!(stderr.contains("points lowered from 80 to 0"));
}

const MORNING: &str = "2024-05-14T08:00:00+02:00";
const NEXT_MORNING: &str = "2024-05-15T08:00:00+02:00";

#[test]
fn test_challenge_cap_rejects_third_completion() {
    let dir = tempfile::tempdir().unwrap();
    for _ in 0..2 {
        let (stdout, _, code) =
            run_cli_at(dir.path(), Some(MORNING), &["challenge", "complete", "20"]);
        assert_eq!(code, 0);
        assert_eq!(parse_json(&stdout)["status"], "completed");
    }
    let (stdout, stderr, code) =
        run_cli_at(dir.path(), Some(MORNING), &["challenge", "complete", "20"]);
    assert_ne!(code, 0);
    let capped = parse_json(&stdout);
    assert_eq!(capped["status"], "cap_reached");
    assert_eq!(capped["cooldown_until"], "2024-05-14T22:00:00Z");
    assert!(stderr.contains("limit of 2"));

    let (stdout, _, code) =
        run_cli_at(dir.path(), Some(MORNING), &["challenge", "remaining", "--quiz"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "5");
}

#[test]
fn test_challenge_cap_resets_next_day() {
    let dir = tempfile::tempdir().unwrap();
    for _ in 0..2 {
        run_cli_at(dir.path(), Some(MORNING), &["challenge", "complete", "20"]);
    }
    let (stdout, _, _) = run_cli_at(dir.path(), Some(MORNING), &["challenge", "remaining"]);
    assert_eq!(stdout.trim(), "0");

    let (stdout, _, code) = run_cli_at(dir.path(), Some(NEXT_MORNING), &["challenge", "remaining"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "2");

    let (stdout, _, code) = run_cli_at(dir.path(), Some(NEXT_MORNING), &["streak"]);
    assert_eq!(code, 0);
    assert_eq!(parse_json(&stdout)["count"], 1);
}

#[test]
fn test_invalid_clock_override_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli_at(dir.path(), Some("yesterday"), &["streak"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("LEVELUP_NOW"));
}

#[test]
fn test_out_of_range_bonus_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(
        dir.path(),
        &["config", "set", "bonus", r#"[{"min_level":1,"percent":4294967295}]"#],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("bonus"));

    let (stdout, _, code) = run_cli(dir.path(), &["level", "--points", "225"]);
    assert_eq!(code, 0);
    assert_eq!(parse_json(&stdout)["bonus_multiplier"], 1.05);
}

#[test]
fn test_streak_after_completion() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["challenge", "complete", "10", "--quiz"]);
    let (stdout, _, code) = run_cli(dir.path(), &["streak"]);
    assert_eq!(code, 0);
    assert_eq!(parse_json(&stdout)["count"], 1);
}

#[test]
fn test_daily_content_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let (first, _, code) = run_cli_at(dir.path(), Some(MORNING), &["daily", "--quiz"]);
    assert_eq!(code, 0);
    let first = parse_json(&first);
    assert_eq!(first["refreshed"], true);
    assert_eq!(first["items"].as_array().map(Vec::len), Some(5));

    assert_eq!(first["events"][0]["type"], "DailyContentRefreshed");

    let (second, _, _) = run_cli_at(dir.path(), Some(MORNING), &["daily", "--quiz"]);
    let second = parse_json(&second);
    assert_eq!(second["refreshed"], false);
    assert_eq!(second["items"], first["items"]);

    let (third, _, _) = run_cli_at(dir.path(), Some(NEXT_MORNING), &["daily", "--quiz"]);
    assert_eq!(parse_json(&third)["refreshed"], true);
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "caps.challenges"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "2");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "caps.challenges", "3"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "caps.challenges"]);
    assert_eq!(stdout.trim(), "3");

    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "caps.challenges", "0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("caps.challenges"));

    let (_, _, code) = run_cli(dir.path(), &["config", "get", "caps.unknown"]);
    assert_ne!(code, 0);
}
