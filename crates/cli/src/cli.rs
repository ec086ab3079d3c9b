// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "relayq")]
#[command(about = "An offline-first command queue that syncs to a remote service when reachable")]
#[command(
    long_about = "An offline-first command queue.\n\n\
    Commands are recorded durably while the remote service is unreachable and \
    replayed in order by a background worker once connectivity returns."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize a queue in the current directory
    Init {
        /// Directory to initialize (defaults to the current directory)
        path: Option<String>,
    },

    /// Queue a command for synchronization
    #[command(after_help = "Examples:\n  \
        relayq add \"uptime\"                          Queue a shell command\n  \
        relayq add -t meta \"list devices\"            Queue a meta-command\n  \
        relayq add -t device_route --target kitchen \"lights off\"\n  \
        relayq add \"deploy\" -m priority=high -m tier=2")]
    Add {
        /// Command text to queue
        command: String,

        /// Command type (shell, meta, device_route)
        #[arg(long = "type", short = 't', default_value = "shell")]
        command_type: String,

        /// Target device (required for device_route)
        #[arg(long)]
        target: Option<String>,

        /// Attach metadata as key=value (repeatable)
        #[arg(long = "meta", short = 'm', value_name = "KEY=VALUE")]
        meta: Vec<String>,
    },

    /// Dispatch pending entries immediately, even if the remote looks offline
    Sync {
        /// Show what would be dispatched without touching anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Show queue counts and the last successful sync time
    Status,

    /// List queue entries
    List {
        /// Only show entries with this status (pending, syncing, done, failed)
        #[arg(long)]
        status: Option<String>,
    },

    /// Return failed entries to the queue
    Retry {
        /// Entry ids to requeue
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Delete synced entries older than the retention window
    Purge {
        /// Retention window in days (defaults to the configured value)
        #[arg(long)]
        days: Option<u32>,
    },

    /// Run the background sync worker in the foreground
    Run,
}
