// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use rq_core::EntryStatus;

use crate::commands::{open_queue, truncate};
use crate::error::{Error, Result};

pub fn run(status: Option<&str>) -> Result<()> {
    let filter = match status {
        Some(s) => Some(s.parse::<EntryStatus>().map_err(Error::Core)?),
        None => None,
    };

    let (queue, _, _) = open_queue()?;
    let entries = queue.list(filter)?;

    if entries.is_empty() {
        println!("No entries");
        return Ok(());
    }

    for entry in entries {
        let mut line = format!(
            "#{:<5} {:<8} {:<12} {}",
            entry.id,
            entry.status,
            entry.command_type,
            truncate(&entry.command_text, 50)
        );
        if let Some(target) = &entry.target_device {
            line.push_str(&format!(" -> {}", target));
        }
        if entry.retry_count > 0 {
            line.push_str(&format!(" (retries: {})", entry.retry_count));
        }
        if let Some(error) = &entry.error_message {
            line.push_str(&format!("\n       last error: {}", truncate(error, 70)));
        }
        println!("{}", line);
    }
    Ok(())
}
