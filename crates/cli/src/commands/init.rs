// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use rq_core::PersistentQueue;

use crate::config::{get_db_path, init_work_dir};
use crate::error::Result;

pub fn run(path: Option<String>) -> Result<()> {
    let target_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir()?,
    };

    let work_dir = init_work_dir(&target_path)?;

    // Create the database up front so the first `add` cannot race `init`
    let db_path = get_db_path(&work_dir);
    PersistentQueue::open(&db_path)?;

    println!("Initialized command queue at {}", work_dir.display());
    println!("Edit {} to configure the remote", work_dir.join("config.toml").display());
    Ok(())
}
