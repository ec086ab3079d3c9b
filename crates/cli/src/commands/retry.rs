// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::commands::open_queue;
use crate::error::Result;

pub fn run(ids: &[i64]) -> Result<()> {
    let (queue, _, _) = open_queue()?;

    for &id in ids {
        queue.requeue_failed(id)?;
        println!("Requeued #{}", id);
    }
    Ok(())
}
