// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! rqcli - offline-first command queue library.
//!
//! This crate provides the functionality for the `relayq` CLI tool, which
//! records commands in a SQLite-backed queue and replays them against a
//! remote service once it is reachable.
//!
//! # Main Components
//!
//! - [`Config`] - Project configuration (worker tuning, remote commands)
//! - [`ShellRemote`] - [`rq_core::RemoteClient`] backed by configured shell commands
//! - [`Error`] - Error types for all operations
//!
//! The queue and sync worker themselves live in `rq_core`.

mod cli;
mod commands;

pub mod config;
pub mod error;
pub mod remote;

pub use cli::{Cli, Command};
pub use config::{find_work_dir, get_db_path, get_lock_path, init_work_dir, Config};
pub use error::{Error, Result};
pub use remote::ShellRemote;

/// Execute a parsed command.
pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Init { path } => commands::init::run(path),
        Command::Add {
            command,
            command_type,
            target,
            meta,
        } => commands::add::run(&command, &command_type, target.as_deref(), &meta),
        Command::Sync { dry_run } => commands::sync::run(dry_run),
        Command::Status => commands::status::run(),
        Command::List { status } => commands::list::run(status.as_deref()),
        Command::Retry { ids } => commands::retry::run(&ids),
        Command::Purge { days } => commands::purge::run(days),
        Command::Run => commands::run::run(),
    }
}
