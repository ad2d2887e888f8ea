//! CLI integration tests for autosched
//!
//! These run the binary against request, snapshot and config files in a
//! temporary directory.

use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get a command instance for the autosched binary
fn autosched_cmd() -> assert_cmd::Command {
    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("autosched"))
}

/// Temporary directory holding an empty `autosched.toml`
fn setup_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("autosched.toml"), "").unwrap();
    dir
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const FOLLOWER_REQUEST: &str = r#"{
    "snapshot": {
        "items": [
            {"id": 1, "start_date": "2025-01-02", "due_date": "2025-01-02", "duration": 1},
            {"id": 2, "scheduling_mode": "automatic", "duration": 3}
        ]
    },
    "trigger": {"kind": "relation_added", "predecessor": 1, "successor": 2}
}"#;

// =============================================================================
// Resolve
// =============================================================================

#[test]
fn test_resolve_prints_changes() {
    let dir = setup_dir();
    let request = write_file(&dir, "request.json", FOLLOWER_REQUEST);

    autosched_cmd()
        .current_dir(dir.path())
        .arg("resolve")
        .arg(&request)
        .assert()
        .success()
        .stdout(predicate::str::contains("#2"))
        .stdout(predicate::str::contains("2025-01-03"))
        .stdout(predicate::str::contains("2025-01-07"))
        .stdout(predicate::str::contains("1 item(s) rescheduled"));
}

#[test]
fn test_resolve_json_output() {
    let dir = setup_dir();
    let request = write_file(&dir, "request.json", FOLLOWER_REQUEST);

    let output = autosched_cmd()
        .current_dir(dir.path())
        .args(["--format", "json", "resolve"])
        .arg(&request)
        .output()
        .unwrap();

    assert!(output.status.success());
    let changes: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        changes,
        serde_json::json!([{
            "id": 2,
            "start_date": "2025-01-03",
            "due_date": "2025-01-07",
            "duration": 3,
            "ignore_non_working_days": false
        }])
    );
}

#[test]
fn test_resolve_commit_prints_snapshot() {
    let dir = setup_dir();
    let request = write_file(&dir, "request.json", FOLLOWER_REQUEST);

    let output = autosched_cmd()
        .current_dir(dir.path())
        .args(["resolve", "--commit", "--format", "json"])
        .arg(&request)
        .output()
        .unwrap();

    assert!(output.status.success());
    let snapshot: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(snapshot["relations"][0]["predecessor"], 1);
    assert_eq!(snapshot["items"][1]["start_date"], "2025-01-03");
    assert_eq!(snapshot["items"][1]["due_date"], "2025-01-07");
}

#[test]
fn test_resolve_with_no_changes() {
    let dir = setup_dir();
    let request = write_file(
        &dir,
        "request.json",
        r#"{
            "snapshot": {"items": [{"id": 1}, {"id": 2, "parent_id": 1}]},
            "trigger": {"kind": "mode_toggled", "item": 1, "mode": "manual"}
        }"#,
    );

    autosched_cmd()
        .current_dir(dir.path())
        .arg("resolve")
        .arg(&request)
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes."));
}

#[test]
fn test_resolve_request_calendar_overrides_config() {
    let dir = setup_dir();
    let request = write_file(
        &dir,
        "request.json",
        r#"{
            "snapshot": {
                "items": [
                    {"id": 1, "start_date": "2025-01-02", "due_date": "2025-01-02", "duration": 1},
                    {"id": 2, "scheduling_mode": "automatic", "duration": 3}
                ]
            },
            "trigger": {"kind": "relation_added", "predecessor": 1, "successor": 2},
            "calendar": {"non_working_weekdays": []}
        }"#,
    );

    autosched_cmd()
        .current_dir(dir.path())
        .arg("resolve")
        .arg(&request)
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-01-05"));
}

#[test]
fn test_resolve_cycle_rejected() {
    let dir = setup_dir();
    let request = write_file(
        &dir,
        "request.json",
        r#"{
            "snapshot": {
                "items": [{"id": 1}, {"id": 2}],
                "relations": [{"predecessor": 1, "successor": 2}]
            },
            "trigger": {"kind": "relation_added", "predecessor": 2, "successor": 1}
        }"#,
    );

    autosched_cmd()
        .current_dir(dir.path())
        .arg("resolve")
        .arg(&request)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Error: Cannot apply relation_added trigger"))
        .stderr(predicate::str::contains("would create a cycle"));
}

#[test]
fn test_resolve_missing_file() {
    let dir = setup_dir();

    autosched_cmd()
        .current_dir(dir.path())
        .args(["resolve", "absent.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read resolve request"));
}

#[test]
fn test_verbose_logs_keep_stdout_clean() {
    let dir = setup_dir();
    let request = write_file(&dir, "request.json", FOLLOWER_REQUEST);

    let output = autosched_cmd()
        .current_dir(dir.path())
        .args(["--verbose", "--format", "json", "resolve"])
        .arg(&request)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(!output.stderr.is_empty());
    let changes: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(changes.is_array());
}

// =============================================================================
// Check
// =============================================================================

#[test]
fn test_check_reports_summary() {
    let dir = setup_dir();
    let snapshot = write_file(
        &dir,
        "snapshot.json",
        r#"{
            "items": [
                {"id": 1, "scheduling_mode": "automatic"},
                {"id": 2, "parent_id": 1, "start_date": "2025-01-06", "due_date": "2025-01-07", "duration": 2}
            ]
        }"#,
    );

    autosched_cmd()
        .current_dir(dir.path())
        .arg("check")
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(predicate::str::contains("Snapshot OK"))
        .stdout(predicate::str::contains("2 (1 automatic)"))
        .stdout(predicate::str::contains("Max depth:       1"));
}

#[test]
fn test_check_json_flags_duration_drift() {
    let dir = setup_dir();
    let snapshot = write_file(
        &dir,
        "snapshot.json",
        r#"{"items": [{"id": 4, "start_date": "2025-01-03", "due_date": "2025-01-07", "duration": 5}]}"#,
    );

    let output = autosched_cmd()
        .current_dir(dir.path())
        .args(["check", "--format", "json"])
        .arg(&snapshot)
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["valid"], true);
    assert_eq!(report["inconsistent_durations"], serde_json::json!([4]));
    assert_eq!(report["max_depth"], 0);
}

#[test]
fn test_check_accepts_parent_outside_snapshot() {
    let dir = setup_dir();
    let snapshot = write_file(
        &dir,
        "snapshot.json",
        r#"{"items": [{"id": 7, "parent_id": 3}, {"id": 8, "parent_id": 7}]}"#,
    );

    let output = autosched_cmd()
        .current_dir(dir.path())
        .args(["check", "--format", "json"])
        .arg(&snapshot)
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["roots"], 1);
    assert_eq!(report["hierarchy_edges"], 1);
}

#[test]
fn test_check_rejects_inverted_dates() {
    let dir = setup_dir();
    let snapshot = write_file(
        &dir,
        "snapshot.json",
        r#"{"items": [{"id": 1, "start_date": "2025-01-08", "due_date": "2025-01-06"}]}"#,
    );

    autosched_cmd()
        .current_dir(dir.path())
        .arg("check")
        .arg(&snapshot)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid snapshot"))
        .stderr(predicate::str::contains("#1 ends before it starts"));
}

#[test]
fn test_check_rejects_cyclic_snapshot() {
    let dir = setup_dir();
    let snapshot = write_file(
        &dir,
        "snapshot.json",
        r#"{
            "items": [{"id": 1}, {"id": 2}],
            "relations": [
                {"predecessor": 1, "successor": 2},
                {"predecessor": 2, "successor": 1}
            ]
        }"#,
    );

    autosched_cmd()
        .current_dir(dir.path())
        .arg("check")
        .arg(&snapshot)
        .assert()
        .failure()
        .stderr(predicate::str::contains("would create a cycle"));
}

// =============================================================================
// Calendar
// =============================================================================

#[test]
fn test_calendar_is_working() {
    let dir = setup_dir();

    autosched_cmd()
        .current_dir(dir.path())
        .args(["calendar", "is-working", "2025-01-04"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-01-04 is not a working day"));
}

#[test]
fn test_calendar_shift() {
    let dir = setup_dir();

    autosched_cmd()
        .current_dir(dir.path())
        .args(["calendar", "shift", "2025-01-03", "1"])
        .assert()
        .success()
        .stdout("2025-01-06\n");

    autosched_cmd()
        .current_dir(dir.path())
        .args(["calendar", "shift", "2025-01-06", "-1", "--all-days"])
        .assert()
        .success()
        .stdout("2025-01-05\n");
}

#[test]
fn test_calendar_count_uses_config_holidays() {
    let dir = TempDir::new().unwrap();
    let config = write_file(
        &dir,
        "holidays.toml",
        r#"
[calendar]
non_working_weekdays = ["sat", "sun"]
non_working_dates = ["2025-01-01", "2025-12-25"]
"#,
    );

    let output = autosched_cmd()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["--format", "json", "calendar", "count", "2025-01-01", "2025-12-31"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["days"], 259);
}

#[test]
fn test_calendar_count_inverted_range() {
    let dir = setup_dir();

    autosched_cmd()
        .current_dir(dir.path())
        .args(["calendar", "count", "2025-01-10", "2025-01-06"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Range ends before it starts"));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_discovered_from_parent_dir() {
    let dir = TempDir::new().unwrap();
    write_file(
        &dir,
        "autosched.toml",
        "[calendar]\nnon_working_weekdays = [\"sun\"]\n\n[output]\nformat = \"json\"\n",
    );
    let nested = dir.path().join("plans");
    fs::create_dir_all(&nested).unwrap();

    let output = autosched_cmd()
        .current_dir(&nested)
        .args(["calendar", "is-working", "2025-01-04"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["working"], true);
}

#[test]
fn test_format_flag_overrides_config() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "autosched.toml", "[output]\nformat = \"json\"\n");

    autosched_cmd()
        .current_dir(dir.path())
        .args(["--format", "text", "calendar", "shift", "2025-01-03", "0"])
        .assert()
        .success()
        .stdout("2025-01-03\n");
}

#[test]
fn test_invalid_config_rejected() {
    let dir = TempDir::new().unwrap();
    write_file(
        &dir,
        "autosched.toml",
        "[calendar]\nnon_working_weekdays = [\"mon\", \"tue\", \"wed\", \"thu\", \"fri\", \"sat\", \"sun\"]\n",
    );

    autosched_cmd()
        .current_dir(dir.path())
        .args(["calendar", "is-working", "2025-01-06"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}
