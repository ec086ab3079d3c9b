// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rq_core::SyncWorker;

use crate::commands::load_project;
use crate::config::{get_db_path, get_lock_path};
use crate::error::{Error, Result};
use crate::remote::ShellRemote;

pub fn run() -> Result<()> {
    setup_logging();

    let (work_dir, config) = load_project()?;

    // One worker per queue; dispatch must not be raced
    let lock_path = get_lock_path(&work_dir);
    let _lock = acquire_lock(&lock_path)
        .map_err(|_| Error::WorkerAlreadyRunning(lock_path.display().to_string()))?;

    let remote = ShellRemote::new(config.remote.clone());
    let mut worker = SyncWorker::new(
        get_db_path(&work_dir),
        Arc::new(remote),
        config.worker.to_worker_config(),
    );
    worker.on_sync_complete(|synced| {
        tracing::info!(synced, "sync batch complete");
    });

    worker.start();
    tracing::info!(work_dir = %work_dir.display(), "worker running; press Ctrl-C to stop");

    // Foreground process: the worker thread does all the work
    loop {
        std::thread::sleep(Duration::from_secs(60));
    }
}

fn setup_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Acquire an exclusive lock on the lock file.
fn acquire_lock(lock_path: &Path) -> std::io::Result<File> {
    use fs2::FileExt;

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)?;

    // Try to acquire exclusive lock (non-blocking)
    file.try_lock_exclusive()?;

    Ok(file)
}
