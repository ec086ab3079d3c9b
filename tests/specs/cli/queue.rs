// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rust specs for the queue-management commands: init, add, status, list,
//! retry, purge, and sync --dry-run.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn relayq() -> Command {
    cargo_bin_cmd!("relayq")
}

fn init_temp() -> TempDir {
    let temp = TempDir::new().unwrap();
    relayq()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

// =============================================================================
// init
// =============================================================================

#[test]
fn init_creates_work_dir() {
    let temp = init_temp();
    assert!(temp.path().join(".relayq").is_dir());
    assert!(temp.path().join(".relayq/config.toml").is_file());
    assert!(temp.path().join(".relayq/queue.db").is_file());
}

#[test]
fn init_twice_fails() {
    let temp = init_temp();
    relayq()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn commands_require_init() {
    let temp = TempDir::new().unwrap();
    relayq()
        .arg("status")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("relayq init"));
}

#[test]
fn work_dir_is_found_from_subdirectory() {
    let temp = init_temp();
    let nested = temp.path().join("a/b");
    std::fs::create_dir_all(&nested).unwrap();

    relayq()
        .arg("add")
        .arg("from below")
        .current_dir(&nested)
        .assert()
        .success();

    relayq()
        .arg("list")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("from below"));
}

// =============================================================================
// add
// =============================================================================

#[test]
fn add_defaults_to_shell_type() {
    let temp = init_temp();
    relayq()
        .arg("add")
        .arg("uptime")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Queued #1 (shell)"));
}

#[test]
fn add_accepts_meta_type() {
    let temp = init_temp();
    relayq()
        .args(["add", "-t", "meta", "list devices"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("(meta)"));
}

#[test]
fn add_device_route_requires_target() {
    let temp = init_temp();
    relayq()
        .args(["add", "-t", "device_route", "lights off"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("target device"));

    relayq()
        .args(["add", "-t", "device_route", "--target", "kitchen", "lights off"])
        .current_dir(temp.path())
        .assert()
        .success();
}

#[test]
fn add_rejects_unknown_type() {
    let temp = init_temp();
    relayq()
        .args(["add", "-t", "cloud", "nope"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid command type"));
}

#[test]
fn add_rejects_malformed_metadata() {
    let temp = init_temp();
    relayq()
        .args(["add", "task", "-m", "priority"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("key=value"));
}

#[test]
fn add_assigns_sequential_ids() {
    let temp = init_temp();
    for (i, cmd) in ["one", "two", "three"].iter().enumerate() {
        relayq()
            .arg("add")
            .arg(cmd)
            .current_dir(temp.path())
            .assert()
            .success()
            .stdout(predicate::str::contains(format!("Queued #{}", i + 1)));
    }
}

// =============================================================================
// status / list
// =============================================================================

#[test]
fn status_on_empty_queue() {
    let temp = init_temp();
    relayq()
        .arg("status")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Pending: 0"))
        .stdout(predicate::str::contains("Last sync: never"));
}

#[test]
fn status_counts_pending_entries() {
    let temp = init_temp();
    for cmd in ["a", "b"] {
        relayq().arg("add").arg(cmd).current_dir(temp.path()).assert().success();
    }

    relayq()
        .arg("status")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Pending: 2"));
}

#[test]
fn list_shows_entries_in_order() {
    let temp = init_temp();
    relayq().args(["add", "first"]).current_dir(temp.path()).assert().success();
    relayq().args(["add", "second"]).current_dir(temp.path()).assert().success();

    let output = relayq()
        .arg("list")
        .current_dir(temp.path())
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let first = stdout.find("first").unwrap();
    let second = stdout.find("second").unwrap();
    assert!(first < second);
}

#[test]
fn list_filters_by_status() {
    let temp = init_temp();
    relayq().args(["add", "waiting"]).current_dir(temp.path()).assert().success();

    relayq()
        .args(["list", "--status", "done"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No entries"));

    relayq()
        .args(["list", "--status", "pending"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("waiting"));
}

#[test]
fn list_rejects_unknown_status() {
    let temp = init_temp();
    relayq()
        .args(["list", "--status", "stuck"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid entry status"));
}

// =============================================================================
// sync --dry-run
// =============================================================================

#[test]
fn dry_run_lists_without_dispatching() {
    let temp = init_temp();
    relayq().args(["add", "uptime"]).current_dir(temp.path()).assert().success();

    relayq()
        .args(["sync", "--dry-run"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Would dispatch 1 command(s)"))
        .stdout(predicate::str::contains("uptime"));

    // Still pending afterwards
    relayq()
        .arg("status")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Pending: 1"));
}

#[test]
fn dry_run_on_empty_queue() {
    let temp = init_temp();
    relayq()
        .args(["sync", "--dry-run"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to sync"));
}

// =============================================================================
// retry
// =============================================================================

#[test]
fn retry_rejects_pending_entry() {
    let temp = init_temp();
    relayq().args(["add", "still waiting"]).current_dir(temp.path()).assert().success();

    relayq()
        .args(["retry", "1"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("pending"));
}

#[test]
fn retry_unknown_id_fails() {
    let temp = init_temp();
    relayq()
        .args(["retry", "99"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

// =============================================================================
// purge
// =============================================================================

#[test]
fn purge_reports_zero_on_fresh_queue() {
    let temp = init_temp();
    relayq().args(["add", "keep me"]).current_dir(temp.path()).assert().success();

    relayq()
        .arg("purge")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Purged 0"));

    relayq()
        .arg("list")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("keep me"));
}
