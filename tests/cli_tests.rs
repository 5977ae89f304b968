mod common;

use common::{run_with, setup_config, timegrid};
use predicates::prelude::*;
use predicates::str::contains;

#[test]
fn set_then_show_month() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup_config(dir.path());

    run_with(&config)
        .args(["set", "default", "2026-03-02", "8"])
        .assert()
        .success()
        .stdout(contains("default 2026-03-02 = 8"));

    run_with(&config)
        .args(["show", "--year", "2026", "--month", "3"])
        .assert()
        .success()
        .stdout(contains("2026-03"))
        .stdout(contains("Ordinary hours"))
        .stdout(predicate::str::is_match(r"Sum(\s+\d+)+\s+8\n$").unwrap());
}

#[test]
fn set_rejects_hours_out_of_range() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup_config(dir.path());

    run_with(&config)
        .args(["set", "default", "2026-03-02", "13"])
        .assert()
        .failure()
        .stderr(contains("Hours must be between 0 and 12"));
}

#[test]
fn set_requires_a_known_project() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup_config(dir.path());

    run_with(&config)
        .args(["set", "p-9", "2026-03-02", "4"])
        .assert()
        .failure()
        .stderr(contains("Unknown project: p-9"));
}

#[test]
fn project_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup_config(dir.path());

    run_with(&config)
        .args(["projects", "add", "p-1", "Client work"])
        .assert()
        .success();
    run_with(&config)
        .args(["projects", "list"])
        .assert()
        .success()
        .stdout(contains("Ordinary hours"))
        .stdout(contains("Client work"));

    run_with(&config)
        .args(["projects", "archive", "p-1"])
        .assert()
        .success();
    run_with(&config)
        .args(["projects", "list"])
        .assert()
        .success()
        .stdout(contains("(archived)"));
    run_with(&config)
        .args(["show", "--year", "2026", "--month", "3"])
        .assert()
        .success()
        .stdout(contains("Client work").not());

    run_with(&config)
        .args(["projects", "remove", "p-1"])
        .assert()
        .success()
        .stdout(contains("Removed 'Client work'"));
    run_with(&config)
        .args(["projects", "remove", "default"])
        .assert()
        .failure()
        .stderr(contains("cannot be removed"));
}

#[test]
fn absence_marks_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup_config(dir.path());

    run_with(&config)
        .args(["absence", "2026-03-04", "vacation"])
        .assert()
        .success()
        .stdout(contains("2026-03-04: vacation"));
    run_with(&config)
        .args(["absence", "2026-03-04"])
        .assert()
        .success()
        .stdout(contains("2026-03-04: vacation"));
    run_with(&config)
        .args(["show", "--year", "2026", "--month", "3"])
        .assert()
        .success()
        .stdout(contains("Absence"));
    run_with(&config)
        .args(["absence", "2026-03-04", "holiday"])
        .assert()
        .failure()
        .stderr(contains("Invalid absence kind"));
}

#[test]
fn remote_commands_need_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup_config(dir.path());

    run_with(&config)
        .args(["set", "default", "2026-03-02", "8"])
        .assert()
        .success();
    run_with(&config)
        .args(["upload", "2026-03-02"])
        .assert()
        .failure()
        .stderr(contains("Not authenticated"));
    run_with(&config)
        .args(["upload", "2026-03-03"])
        .assert()
        .success()
        .stdout(contains("Nothing to upload"));
}

#[test]
fn config_init_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fresh").join("timegrid.yaml");

    timegrid()
        .arg("--config")
        .arg(&path)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(contains("Config file:"));
    assert!(path.exists());

    timegrid()
        .arg("--config")
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(contains("max_hours: 12"))
        .stdout(contains("api.payzlip.se"));
}

#[test]
fn db_flag_overrides_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup_config(dir.path());
    let other = dir.path().join("other.sqlite");

    run_with(&config)
        .arg("--db")
        .arg(&other)
        .args(["set", "default", "2026-03-02", "3"])
        .assert()
        .success();
    assert!(other.exists());

    run_with(&config)
        .args(["show", "--year", "2026", "--month", "3"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"Sum(\s+\d+)+\s+0\n$").unwrap());
}
