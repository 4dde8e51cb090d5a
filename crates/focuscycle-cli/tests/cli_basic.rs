//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a temporary data directory and
//! verify its JSON output.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_focuscycle"))
        .args(args)
        .env("FOCUSCYCLE_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn run_json(data_dir: &Path, args: &[&str]) -> serde_json::Value {
    let (code, stdout, stderr) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("stdout is JSON")
}

#[test]
fn test_status_on_fresh_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let report = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(report["timer"]["state"]["state"], "idle");
    assert_eq!(report["timer"]["remaining_seconds"], 1500);
    assert_eq!(report["timer"]["display"], "25:00");
    assert!(report["events"].as_array().unwrap().is_empty());
}

#[test]
fn test_start_pause_resume_stop() {
    let dir = tempfile::tempdir().unwrap();

    let report = run_json(dir.path(), &["timer", "start"]);
    assert_eq!(report["timer"]["state"]["state"], "focusing");
    assert_eq!(report["events"][0]["type"], "session_started");

    let report = run_json(dir.path(), &["timer", "pause"]);
    assert_eq!(report["timer"]["state"]["state"], "paused");
    assert_eq!(report["timer"]["state"]["previous"], "focusing");

    let report = run_json(dir.path(), &["timer", "start"]);
    assert_eq!(report["events"][0]["type"], "session_resumed");

    let report = run_json(dir.path(), &["timer", "stop"]);
    assert_eq!(report["timer"]["state"]["state"], "idle");
    assert_eq!(report["timer"]["total_sessions"], 0);
}

#[test]
fn test_start_break_kind() {
    let dir = tempfile::tempdir().unwrap();
    let report = run_json(dir.path(), &["timer", "start", "--kind", "short-break"]);
    assert_eq!(report["timer"]["state"]["state"], "short_break");
    assert_eq!(report["timer"]["total_seconds"], 300);
}

#[test]
fn test_suspend_and_resume_keep_interval_running() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["timer", "start"]);

    let report = run_json(dir.path(), &["timer", "suspend"]);
    assert_eq!(report["events"][0]["type"], "suspended");

    let report = run_json(dir.path(), &["timer", "resume"]);
    assert_eq!(report["timer"]["state"]["state"], "focusing");
    assert_eq!(report["timer"]["suspended"], false);
}

#[test]
fn test_config_set_get_and_apply() {
    let dir = tempfile::tempdir().unwrap();

    let (code, stdout, _) =
        run_cli(dir.path(), &["config", "set", "durations.focus_seconds", "600"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (code, stdout, _) = run_cli(dir.path(), &["config", "get", "durations.focus_seconds"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "600");

    let report = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(report["timer"]["remaining_seconds"], 600);

    let report = run_json(dir.path(), &["config", "list"]);
    assert_eq!(report["durations"]["focus_seconds"], 600);
}

#[test]
fn test_config_set_while_running_restarts_interval() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["timer", "start"]);

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "durations.focus_seconds", "1200"]);
    assert_eq!(code, 0);

    let report = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(report["timer"]["state"]["state"], "focusing");
    assert_eq!(report["timer"]["total_seconds"], 1200);
}

#[test]
fn test_config_errors_exit_nonzero() {
    let dir = tempfile::tempdir().unwrap();

    let (code, _, stderr) = run_cli(dir.path(), &["config", "get", "durations.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    let (code, _, stderr) =
        run_cli(dir.path(), &["config", "set", "durations.focus_seconds", "soon"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("durations.focus_seconds"));
}

#[test]
fn test_config_reset() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["config", "set", "audio.ambience", "rain"]);

    let (code, _, _) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0);

    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "audio.ambience"]);
    assert_eq!(stdout.trim(), "null");
}

#[test]
fn test_stats_today_and_history() {
    let dir = tempfile::tempdir().unwrap();

    let today = run_json(dir.path(), &["stats", "today"]);
    assert_eq!(today["sessions_completed_today"], 0);
    assert_eq!(today["total_sessions"], 0);

    let history = run_json(dir.path(), &["stats", "history", "--days", "3"]);
    let days = history.as_array().unwrap();
    assert!(days.len() <= 3);
}
