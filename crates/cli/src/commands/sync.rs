// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use rq_core::SyncWorker;

use crate::commands::{open_queue, truncate};
use crate::config::get_db_path;
use crate::error::Result;
use crate::remote::ShellRemote;

pub fn run(dry_run: bool) -> Result<()> {
    let (queue, work_dir, config) = open_queue()?;

    if dry_run {
        let pending = queue.dequeue_eligible(config.worker.batch_size)?;
        if pending.is_empty() {
            println!("Nothing to sync");
            return Ok(());
        }

        println!("Would dispatch {} command(s):", pending.len());
        for entry in pending {
            match entry.target_device.as_deref() {
                Some(target) => println!(
                    "  #{} {} -> {}  {}",
                    entry.id,
                    entry.command_type,
                    target,
                    truncate(&entry.command_text, 60)
                ),
                None => println!(
                    "  #{} {}  {}",
                    entry.id,
                    entry.command_type,
                    truncate(&entry.command_text, 60)
                ),
            }
        }
        return Ok(());
    }

    let remote = ShellRemote::new(config.remote.clone());
    let worker = SyncWorker::new(
        get_db_path(&work_dir),
        Arc::new(remote),
        config.worker.to_worker_config(),
    );

    let synced = worker.force_sync();
    let status = queue.status()?;
    println!("Synced {} command(s)", synced);
    if status.pending > 0 || status.failed > 0 {
        println!("{} pending, {} failed", status.pending, status.failed);
    }
    Ok(())
}
