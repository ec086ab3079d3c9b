// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod add;
pub mod init;
pub mod list;
pub mod purge;
pub mod retry;
pub mod run;
pub mod status;
pub mod sync;

use std::path::PathBuf;

use rq_core::PersistentQueue;

use crate::config::{find_work_dir, get_db_path, Config};
use crate::error::Result;

/// Locate the work directory and load its configuration.
pub(crate) fn load_project() -> Result<(PathBuf, Config)> {
    let work_dir = find_work_dir()?;
    let config = Config::load(&work_dir)?;
    Ok((work_dir, config))
}

/// Open the queue database for the current project.
pub(crate) fn open_queue() -> Result<(PersistentQueue, PathBuf, Config)> {
    let (work_dir, config) = load_project()?;
    let db_path = get_db_path(&work_dir);
    let queue = PersistentQueue::open(&db_path)?;
    Ok((queue, work_dir, config))
}

/// Shorten text for single-line display, char-boundary safe.
pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{head}...")
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
