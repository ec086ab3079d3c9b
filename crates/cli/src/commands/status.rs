// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::commands::open_queue;
use crate::error::Result;

pub fn run() -> Result<()> {
    let (queue, _, _) = open_queue()?;
    let status = queue.status()?;

    println!("Pending: {}", status.pending);
    println!("Failed:  {}", status.failed);
    println!("Done:    {}", status.done);
    match status.last_sync {
        Some(ts) => println!("Last sync: {}", ts.to_rfc3339()),
        None => println!("Last sync: never"),
    }
    Ok(())
}
