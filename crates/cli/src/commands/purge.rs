// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::commands::open_queue;
use crate::error::Result;

pub fn run(days: Option<u32>) -> Result<()> {
    let (queue, _, config) = open_queue()?;
    let days = days.unwrap_or(config.worker.retention_days);

    let deleted = queue.purge_older_than(days)?;
    println!("Purged {} synced command(s) older than {} day(s)", deleted, days);
    Ok(())
}
