// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rust specs for `relayq sync` against configured shell remotes.

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

/// Overwrite the project's `[remote]` table with the given commands.
fn configure_remote(temp: &TempDir, remote_table: &str) {
    let config = format!("[worker]\npoll_interval_secs = 1\n\n[remote]\n{remote_table}");
    std::fs::write(temp.path().join(".relayq/config.toml"), config).unwrap();
}

#[test]
fn sync_dispatches_through_configured_commands() {
    let temp = init_temp();
    let log = temp.path().join("sync.log");
    configure_remote(
        &temp,
        &format!(
            "probe = \"true\"\nhistory = \"printf 'history:%s\\\\n' \\\"$RELAYQ_COMMAND\\\" >> {}\"\n",
            log.display()
        ),
    );

    relayq().args(["add", "uptime"]).current_dir(temp.path()).assert().success();
    relayq().args(["add", "whoami"]).current_dir(temp.path()).assert().success();

    relayq()
        .arg("sync")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Synced 2 command(s)"));

    let logged = std::fs::read_to_string(&log).unwrap();
    assert_eq!(logged, "history:uptime\nhistory:whoami\n");

    relayq()
        .arg("status")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Done:    2"))
        .stdout(predicate::str::contains("Last sync:").and(
            predicate::str::contains("Last sync: never").not(),
        ));
}

#[test]
fn sync_routes_device_commands_with_target() {
    let temp = init_temp();
    let log = temp.path().join("route.log");
    configure_remote(
        &temp,
        &format!(
            "route = \"printf '%s:%s\\\\n' \\\"$RELAYQ_TARGET\\\" \\\"$RELAYQ_COMMAND\\\" >> {}\"\n",
            log.display()
        ),
    );

    relayq()
        .args(["add", "-t", "device_route", "--target", "kitchen", "lights off"])
        .current_dir(temp.path())
        .assert()
        .success();

    relayq().arg("sync").current_dir(temp.path()).assert().success();
    assert_eq!(
        std::fs::read_to_string(&log).unwrap(),
        "kitchen:lights off\n"
    );
}

#[test]
fn failed_dispatch_marks_entry_failed() {
    let temp = init_temp();
    configure_remote(&temp, "history = \"false\"\n");

    relayq().args(["add", "doomed"]).current_dir(temp.path()).assert().success();

    relayq()
        .arg("sync")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Synced 0 command(s)"))
        .stdout(predicate::str::contains("1 failed"));

    relayq()
        .args(["list", "--status", "failed"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("doomed"))
        .stdout(predicate::str::contains("retries: 1"));
}

#[test]
fn unconfigured_remote_fails_entries_with_hint() {
    let temp = init_temp();

    relayq().args(["add", "nowhere to go"]).current_dir(temp.path()).assert().success();
    relayq().arg("sync").current_dir(temp.path()).assert().success();

    relayq()
        .args(["list", "--status", "failed"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("no 'history' command configured"));
}

#[test]
fn failed_entries_stay_failed_until_retried() {
    let temp = init_temp();
    configure_remote(&temp, "history = \"false\"\n");

    relayq().args(["add", "flaky"]).current_dir(temp.path()).assert().success();
    relayq().arg("sync").current_dir(temp.path()).assert().success();

    // A second sync must not touch the failed entry
    relayq()
        .arg("sync")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Synced 0 command(s)"));
    relayq()
        .args(["list", "--status", "failed"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("retries: 1"));

    // Flip the remote to a working one and retry
    configure_remote(&temp, "history = \"true\"\n");
    relayq()
        .args(["retry", "1"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Requeued #1"));

    relayq()
        .arg("sync")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Synced 1 command(s)"));
}

#[test]
fn one_failure_does_not_block_the_batch() {
    let temp = init_temp();
    configure_remote(&temp, "history = \"true\"\nmeta = \"false\"\n");

    relayq().args(["add", "-t", "meta", "bad"]).current_dir(temp.path()).assert().success();
    relayq().args(["add", "good"]).current_dir(temp.path()).assert().success();

    relayq()
        .arg("sync")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Synced 1 command(s)"))
        .stdout(predicate::str::contains("1 failed"));
}

#[test]
fn sync_without_probe_still_dispatches() {
    // force-sync semantics: no availability gate on explicit sync
    let temp = init_temp();
    configure_remote(&temp, "history = \"true\"\n");

    relayq().args(["add", "offline but forced"]).current_dir(temp.path()).assert().success();
    relayq()
        .arg("sync")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Synced 1 command(s)"));
}
