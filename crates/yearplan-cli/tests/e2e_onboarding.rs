//! E2E CLI tests covering the setup flow:
//! - `yp init` (fresh, repeated, `--force`)
//! - assigning the anchor and protected days with `yp mark` / `yp protect`
//! - `yp finish` gating on the anchor date
//! - `yp status`, `yp calendar`, `yp countdown`
//! - the remembered default view (`yp view`, bare `yp`)
//!
//! Each test runs `yp` as a subprocess against its own state directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

const TODAY: &str = "2026-01-15";

/// Build a Command targeting the `yp` binary with state kept in `home`.
fn yp(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("yp"));
    cmd.env("YEARPLAN_HOME", home);
    cmd.env("YEARPLAN_CONFIG", home.join("no-config.toml"));
    cmd.env("YEARPLAN_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd.env_remove("GEMINI_API_KEY");
    cmd.args(["--today", TODAY]);
    cmd
}

fn init(home: &Path) {
    yp(home).args(["init", "--year", "2026"]).assert().success();
}

/// Run with `--json`, assert success, and parse stdout.
fn json_ok(home: &Path, args: &[&str]) -> Value {
    let output = yp(home)
        .args(args)
        .arg("--json")
        .output()
        .expect("yp should not crash");
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

/// Run with `--json`, assert failure, and return the error code.
fn json_err_code(home: &Path, args: &[&str]) -> String {
    let output = yp(home)
        .args(args)
        .arg("--json")
        .output()
        .expect("yp should not crash");
    assert!(!output.status.success(), "{args:?} unexpectedly succeeded");
    let err: Value = serde_json::from_slice(&output.stderr).expect("stderr should be JSON");
    err["error"]["error_code"]
        .as_str()
        .expect("error_code")
        .to_string()
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[test]
fn init_rejects_year_without_calendar_dates() {
    let dir = TempDir::new().expect("tempdir");
    assert_eq!(json_err_code(dir.path(), &["init", "--year", "300000"]), "E2010");
    assert!(!dir.path().join("state.json").exists());
}

#[test]
fn verbose_flag_surfaces_info_logs() {
    let dir = TempDir::new().expect("tempdir");
    yp(dir.path())
        .env_remove("YEARPLAN_LOG")
        .env_remove("DEBUG")
        .args(["-v", "init", "--year", "2026"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Verbose mode enabled"))
        .stderr(predicate::str::contains("initialized plan"));

    yp(dir.path())
        .env_remove("YEARPLAN_LOG")
        .env_remove("DEBUG")
        .arg("status")
        .assert()
        .success()
        .stderr(predicate::str::contains("Verbose mode enabled").not());
}

#[test]
fn init_creates_state_with_default_theme() {
    let dir = TempDir::new().expect("tempdir");
    let out = json_ok(dir.path(), &["init", "--year", "2026"]);
    assert_eq!(out["year"], 2026);
    assert_eq!(out["theme"], "Living Uncommon");
    assert_eq!(out["replaced"], false);
    assert!(dir.path().join("state.json").exists());
}

#[test]
fn init_twice_requires_force() {
    let dir = TempDir::new().expect("tempdir");
    init(dir.path());
    assert_eq!(json_err_code(dir.path(), &["init"]), "E1005");

    let out = json_ok(
        dir.path(),
        &["init", "--year", "2027", "--theme", "Fresh start", "--force"],
    );
    assert_eq!(out["replaced"], true);
    assert_eq!(out["year"], 2027);
    assert_eq!(out["theme"], "Fresh start");
}

#[test]
fn commands_before_init_report_missing_plan() {
    let dir = TempDir::new().expect("tempdir");
    assert_eq!(json_err_code(dir.path(), &["status"]), "E1001");

    yp(dir.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1001]"))
        .stderr(predicate::str::contains("suggestion:"));
}

// ---------------------------------------------------------------------------
// mark / protect
// ---------------------------------------------------------------------------

#[test]
fn mark_moves_day_between_owners() {
    let dir = TempDir::new().expect("tempdir");
    init(dir.path());

    let out = json_ok(dir.path(), &["mark", "2026-05-09", "--as", "anchor"]);
    assert_eq!(out["offset"], 128);
    assert_eq!(out["owner"]["kind"], "anchor");
    assert!(out.get("previous").is_none());

    let out = json_ok(dir.path(), &["mark", "128", "--as", "protected"]);
    assert_eq!(out["previous"]["kind"], "anchor");
    assert_eq!(out["owner"]["kind"], "protected");

    let status = json_ok(dir.path(), &["status"]);
    assert!(status["anchor"].get("date").is_none());
    assert_eq!(status["protected_days"], 1);

    let out = json_ok(dir.path(), &["mark", "2026-05-09", "--as", "clear"]);
    assert!(out.get("owner").is_none());
}

#[test]
fn mark_rejects_dates_outside_plan_year() {
    let dir = TempDir::new().expect("tempdir");
    init(dir.path());
    assert_eq!(
        json_err_code(dir.path(), &["mark", "2025-12-31", "--as", "anchor"]),
        "E2002"
    );
    assert_eq!(
        json_err_code(dir.path(), &["mark", "365", "--as", "anchor"]),
        "E2001"
    );
}

#[test]
fn milestone_policy_flag_controls_growth() {
    let dir = TempDir::new().expect("tempdir");
    init(dir.path());
    for day in ["5", "6"] {
        json_ok(dir.path(), &["mark", day, "--as", "milestone", "--slot", "1"]);
    }

    json_ok(dir.path(), &["mark", "20", "--as", "milestone", "--slot", "1"]);
    let list = json_ok(dir.path(), &["milestone", "list"]);
    assert_eq!(list["slots"][0]["days"], serde_json::json!([5, 6, 20]));

    json_ok(
        dir.path(),
        &[
            "mark",
            "30",
            "--as",
            "milestone",
            "--slot",
            "1",
            "--policy",
            "pair-then-reset",
        ],
    );
    let list = json_ok(dir.path(), &["milestone", "list"]);
    assert_eq!(list["slots"][0]["days"], serde_json::json!([30]));
}

#[test]
fn protect_toggles() {
    let dir = TempDir::new().expect("tempdir");
    init(dir.path());

    yp(dir.path())
        .args(["protect", "2026-07-04"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Protected 2026-07-04"));
    yp(dir.path())
        .args(["protect", "2026-07-04"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Released 2026-07-04"));

    let status = json_ok(dir.path(), &["status"]);
    assert_eq!(status["protected_days"], 0);
}

// ---------------------------------------------------------------------------
// finish / status
// ---------------------------------------------------------------------------

#[test]
fn finish_requires_anchor_date() {
    let dir = TempDir::new().expect("tempdir");
    init(dir.path());
    assert_eq!(json_err_code(dir.path(), &["finish"]), "E2009");

    json_ok(
        dir.path(),
        &["anchor", "set", "--title", "Rim to rim", "--date", "2026-10-03"],
    );
    json_ok(dir.path(), &["finish"]);

    let status = json_ok(dir.path(), &["status"]);
    assert_eq!(status["onboarding_complete"], true);
    assert_eq!(status["anchor"]["title"], "Rim to rim");
    assert_eq!(status["anchor"]["date"], "2026-10-03");
    // 2026-01-15 is offset 14, 2026-10-03 is offset 275
    assert_eq!(status["anchor"]["days_until"], 261);
}

#[test]
fn pretty_status_shows_setup_hints() {
    let dir = TempDir::new().expect("tempdir");
    init(dir.path());
    yp(dir.path())
        .args(["status", "--format", "pretty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2026: Living Uncommon"))
        .stdout(predicate::str::contains("Setup is not finished"))
        .stdout(predicate::str::contains("yp finish"));
}

// ---------------------------------------------------------------------------
// calendar / countdown
// ---------------------------------------------------------------------------

#[test]
fn calendar_json_paints_assigned_days() {
    let dir = TempDir::new().expect("tempdir");
    init(dir.path());
    json_ok(dir.path(), &["mark", "2026-02-01", "--as", "anchor"]);
    json_ok(dir.path(), &["mark", "2026-02-02", "--as", "milestone"]);
    json_ok(dir.path(), &["protect", "2026-02-03"]);

    let cal = json_ok(dir.path(), &["calendar", "--month", "2"]);
    let month = &cal["months"][0];
    assert_eq!(month["name"], "February");
    assert_eq!(month["padding"], 6);
    let cells = month["cells"].as_array().expect("cells");
    assert_eq!(cells.len(), 28);
    assert_eq!(cells[0]["paint"], "anchor");
    assert_eq!(cells[1]["paint"], "milestone");
    assert_eq!(cells[2]["paint"], "protected");
    assert_eq!(cells[3]["paint"], "default");
    assert_eq!(cells[0]["crossed"], false);

    let january = json_ok(dir.path(), &["calendar", "--month", "1"]);
    let cells = january["months"][0]["cells"].as_array().expect("cells");
    assert_eq!(cells[14]["paint"], "today");
    assert_eq!(cells[0]["crossed"], true);
    assert_eq!(cells[15]["crossed"], false);
}

#[test]
fn calendar_text_grid_has_markers() {
    let dir = TempDir::new().expect("tempdir");
    init(dir.path());
    json_ok(dir.path(), &["mark", "2026-02-01", "--as", "anchor"]);
    yp(dir.path())
        .args(["calendar", "--month", "2", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("February 2026"))
        .stdout(predicate::str::contains(" Mo  Tu  We  Th  Fr  Sa  Su"))
        .stdout(predicate::str::contains("  1A"));
}

#[test]
fn countdown_reports_next_milestone() {
    let dir = TempDir::new().expect("tempdir");
    init(dir.path());
    let none = json_ok(dir.path(), &["countdown"]);
    assert!(none.is_null());

    json_ok(dir.path(), &["mark", "2026-01-05", "--as", "milestone", "--slot", "1"]);
    json_ok(dir.path(), &["mark", "2026-01-25", "--as", "milestone", "--slot", "2"]);
    json_ok(dir.path(), &["milestone", "set", "2", "--title", "Ski trip"]);

    let next = json_ok(dir.path(), &["countdown"]);
    assert_eq!(next["slot"], 2);
    assert_eq!(next["title"], "Ski trip");
    assert_eq!(next["days_until"], 10);
}

// ---------------------------------------------------------------------------
// views
// ---------------------------------------------------------------------------

#[test]
fn bare_invocation_runs_stored_view() {
    let dir = TempDir::new().expect("tempdir");
    init(dir.path());

    let status = json_ok(dir.path(), &[]);
    assert_eq!(status["year"], 2026);

    let prep = json_ok(dir.path(), &["view", "prep"]);
    assert_eq!(prep["total"], 9);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("active_view"))
            .expect("view file")
            .trim(),
        "prep"
    );

    let again = json_ok(dir.path(), &[]);
    assert_eq!(again["total"], 9);

    let current = json_ok(dir.path(), &["view"]);
    assert_eq!(current["view"], "prep");
}

#[test]
fn completions_need_no_plan() {
    let dir = TempDir::new().expect("tempdir");
    yp(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("yp"));
}
