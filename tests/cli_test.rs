//! Integration tests for the `tickets` CLI.
//!
//! Each test gets its own database via the TICKETS_DB environment variable
//! and a fixed project via TICKETS_PROJECT, so nothing touches the user's
//! real ticket store.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tickets_in(dir: &TempDir, project: &str) -> Command {
    let mut cmd = Command::cargo_bin("tickets").unwrap();
    cmd.env("TICKETS_DB", dir.path().join("tickets.db"))
        .env("TICKETS_PROJECT", project);
    cmd
}

fn create_ticket(dir: &TempDir, project: &str, title: &str, args: &[&str]) {
    let mut cmd = tickets_in(dir, project);
    cmd.args(["create", title, "some description"]);
    cmd.args(args);
    cmd.assert().success();
}

#[test]
fn test_create_and_list() {
    let dir = TempDir::new().unwrap();
    create_ticket(&dir, "/proj", "First ticket", &[]);

    tickets_in(&dir, "/proj")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("First ticket"))
        .stdout(predicate::str::contains("[pending]"))
        .stdout(predicate::str::contains("1 ticket(s)"));
}

#[test]
fn test_create_invalid_priority_fails() {
    let dir = TempDir::new().unwrap();

    tickets_in(&dir, "/proj")
        .args(["create", "T", "D", "--priority", "urgent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid priority"));

    tickets_in(&dir, "/proj")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tickets found."));
}

#[test]
fn test_list_scoped_to_project() {
    let dir = TempDir::new().unwrap();
    create_ticket(&dir, "/proj-a", "ticket in a", &[]);
    create_ticket(&dir, "/proj-b", "ticket in b", &[]);

    tickets_in(&dir, "/proj-a")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("ticket in a"))
        .stdout(predicate::str::contains("ticket in b").not());

    tickets_in(&dir, "/proj-a")
        .args(["list", "--all-projects"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ticket in a"))
        .stdout(predicate::str::contains("ticket in b"))
        .stdout(predicate::str::contains("proj-b"));
}

#[test]
fn test_show_includes_comments() {
    let dir = TempDir::new().unwrap();
    create_ticket(&dir, "/proj", "T", &[]);
    tickets_in(&dir, "/proj")
        .args(["comment", "1", "a progress note"])
        .assert()
        .success();

    tickets_in(&dir, "/proj")
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ticket #1: T"))
        .stdout(predicate::str::contains("Comments (1):"))
        .stdout(predicate::str::contains("a progress note"));
}

#[test]
fn test_show_missing_ticket_fails() {
    let dir = TempDir::new().unwrap();

    tickets_in(&dir, "/proj")
        .args(["show", "999999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_status_change_and_filter() {
    let dir = TempDir::new().unwrap();
    create_ticket(&dir, "/proj", "T", &[]);

    tickets_in(&dir, "/proj")
        .args(["status", "1", "in_progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("status changed to in_progress"));

    tickets_in(&dir, "/proj")
        .args(["list", "--status", "in_progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("T"));

    tickets_in(&dir, "/proj")
        .args(["status", "1", "done"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid status"));
}

#[test]
fn test_edit_without_flags_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    create_ticket(&dir, "/proj", "T", &[]);

    tickets_in(&dir, "/proj")
        .args(["edit", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes specified."));
}

#[test]
fn test_edit_updates_fields() {
    let dir = TempDir::new().unwrap();
    create_ticket(&dir, "/proj", "Old title", &[]);

    tickets_in(&dir, "/proj")
        .args(["edit", "1", "--title", "New title", "--priority", "high"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated ticket #1."));

    tickets_in(&dir, "/proj")
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("New title"))
        .stdout(predicate::str::contains("Priority: high"));
}

#[test]
fn test_delete_then_comment_fails() {
    let dir = TempDir::new().unwrap();
    create_ticket(&dir, "/proj", "T", &[]);

    tickets_in(&dir, "/proj")
        .args(["delete", "1", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted ticket #1."));

    tickets_in(&dir, "/proj")
        .args(["comment", "1", "too late"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_search_matches_comment_content() {
    let dir = TempDir::new().unwrap();
    create_ticket(&dir, "/proj", "Plain title", &[]);
    tickets_in(&dir, "/proj")
        .args(["comment", "1", "mentions zanzibar here"])
        .assert()
        .success();

    tickets_in(&dir, "/proj")
        .args(["search", "zanzibar"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plain title"))
        .stdout(predicate::str::contains("1 result(s)"));
}

#[test]
fn test_list_orders_by_priority() {
    let dir = TempDir::new().unwrap();
    create_ticket(&dir, "/proj", "low one", &["--priority", "low"]);
    create_ticket(&dir, "/proj", "high one", &["--priority", "high"]);
    create_ticket(&dir, "/proj", "medium one", &["--priority", "medium"]);

    let output = tickets_in(&dir, "/proj").arg("list").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    let high = stdout.find("high one").unwrap();
    let medium = stdout.find("medium one").unwrap();
    let low = stdout.find("low one").unwrap();
    assert!(high < medium && medium < low);
}

#[test]
fn test_tag_filter_whole_tags_only() {
    let dir = TempDir::new().unwrap();
    create_ticket(&dir, "/proj", "tagged bug", &["--tags", "bug,urgent"]);
    create_ticket(&dir, "/proj", "tagged bugfix", &["--tags", "bugfix"]);

    tickets_in(&dir, "/proj")
        .args(["list", "--tag", "bug"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tagged bug"))
        .stdout(predicate::str::contains("tagged bugfix").not());
}
