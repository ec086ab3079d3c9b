// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Project configuration management.
//!
//! Configuration is stored in `.relayq/config.toml` and includes:
//! - `[worker]`: sync worker tuning (poll interval, backoff cap, batch size)
//! - `[remote]`: shell commands the CLI dispatches queue entries through

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rq_core::WorkerConfig;

use crate::error::{Error, Result};

const WORK_DIR_NAME: &str = ".relayq";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "queue.db";
const LOCK_FILE_NAME: &str = "worker.lock";

/// Project configuration stored in `.relayq/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Sync worker tuning.
    #[serde(default)]
    pub worker: WorkerSettings,
    /// Shell commands for remote operations.
    #[serde(default)]
    pub remote: RemoteCommands,
}

/// Sync worker tuning, all fields optional in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSettings {
    /// Base seconds between sync iterations (also the first backoff step).
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Ceiling on the backoff wait, in seconds.
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
    /// Maximum entries dispatched per iteration.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Seconds before an in-flight entry is considered abandoned.
    #[serde(default = "default_stale_timeout_secs")]
    pub stale_timeout_secs: u64,
    /// Days synced entries are kept before `relayq purge` deletes them.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_max_backoff_secs() -> u64 {
    300
}

fn default_batch_size() -> usize {
    10
}

fn default_stale_timeout_secs() -> u64 {
    300
}

fn default_retention_days() -> u32 {
    7
}

impl Default for WorkerSettings {
    fn default() -> Self {
        WorkerSettings {
            poll_interval_secs: default_poll_interval_secs(),
            max_backoff_secs: default_max_backoff_secs(),
            batch_size: default_batch_size(),
            stale_timeout_secs: default_stale_timeout_secs(),
            retention_days: default_retention_days(),
        }
    }
}

impl WorkerSettings {
    /// Convert file-level settings into the core worker configuration.
    pub fn to_worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            max_backoff: Duration::from_secs(self.max_backoff_secs),
            batch_size: self.batch_size,
            stale_timeout: Duration::from_secs(self.stale_timeout_secs),
            ..WorkerConfig::default()
        }
    }
}

/// Shell commands the CLI runs for each remote operation.
///
/// Every field is optional. An absent `probe` means the remote is treated as
/// unavailable; an absent dispatch command fails entries of that type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteCommands {
    /// Availability check; exit status 0 means the remote is reachable.
    pub probe: Option<String>,
    /// Delivers `device_route` entries. Sees RELAYQ_COMMAND and RELAYQ_TARGET.
    pub route: Option<String>,
    /// Delivers `meta` entries. Sees RELAYQ_COMMAND.
    pub meta: Option<String>,
    /// Delivers `shell` entries. Sees RELAYQ_COMMAND.
    pub history: Option<String>,
}

impl Config {
    /// Loads configuration from the given `.relayq/` directory.
    pub fn load(work_dir: &Path) -> Result<Self> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Saves configuration to the given `.relayq/` directory.
    pub fn save(&self, work_dir: &Path) -> Result<()> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }
}

/// Find the .relayq directory by walking up from the current directory
pub fn find_work_dir() -> Result<PathBuf> {
    let mut current = std::env::current_dir()?;
    loop {
        let work_dir = current.join(WORK_DIR_NAME);
        if work_dir.is_dir() {
            return Ok(work_dir);
        }
        if !current.pop() {
            return Err(Error::NotInitialized);
        }
    }
}

/// Get the queue database path for the given work directory.
pub fn get_db_path(work_dir: &Path) -> PathBuf {
    work_dir.join(DB_FILE_NAME)
}

/// Get the worker lock file path for the given work directory.
pub fn get_lock_path(work_dir: &Path) -> PathBuf {
    work_dir.join(LOCK_FILE_NAME)
}

/// Initialize a new .relayq directory at the given path
pub fn init_work_dir(path: &Path) -> Result<PathBuf> {
    let work_dir = path.join(WORK_DIR_NAME);

    if work_dir.exists() {
        return Err(Error::AlreadyInitialized(work_dir.display().to_string()));
    }

    fs::create_dir_all(&work_dir)?;

    let config = Config::default();
    config.save(&work_dir)?;

    Ok(work_dir)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
