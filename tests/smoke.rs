//! Smoke tests -- verify the binary runs and key subcommands exist.

use assert_cmd::Command;

#[test]
fn test_cli_help() {
    Command::cargo_bin("eventsweep")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains("Expired-event cleanup daemon"));
}

#[test]
fn test_cli_version() {
    Command::cargo_bin("eventsweep")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::contains("eventsweep"));
}

#[test]
fn test_serve_subcommand_exists() {
    Command::cargo_bin("eventsweep")
        .unwrap()
        .args(["serve", "--help"])
        .assert()
        .success();
}

#[test]
fn test_cleanup_subcommand_exists() {
    Command::cargo_bin("eventsweep")
        .unwrap()
        .args(["cleanup", "--help"])
        .assert()
        .success();
}

#[test]
fn test_schedule_subcommands_exist() {
    Command::cargo_bin("eventsweep")
        .unwrap()
        .args(["schedule", "arm", "--help"])
        .assert()
        .success();

    Command::cargo_bin("eventsweep")
        .unwrap()
        .args(["schedule", "status", "--help"])
        .assert()
        .success();
}

#[test]
fn test_cleanup_runs_against_fresh_database() {
    let dir = tempfile::TempDir::new().unwrap();
    let db = dir.path().join("smoke.db");

    Command::cargo_bin("eventsweep")
        .unwrap()
        .args(["cleanup", "--db", db.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicates::str::contains("No expired events found"));
}

#[test]
fn test_schedule_status_on_fresh_database_is_inactive() {
    let dir = tempfile::TempDir::new().unwrap();
    let db = dir.path().join("smoke.db");

    Command::cargo_bin("eventsweep")
        .unwrap()
        .args(["schedule", "status", "--db", db.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicates::str::contains("Active:   false"));
}
