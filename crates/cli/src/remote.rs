// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shell-command remote client.
//!
//! Each remote operation is a user-configured shell command run with
//! `sh -c`, receiving the queue entry through environment variables:
//! `RELAYQ_COMMAND` carries the command text and, for routed commands,
//! `RELAYQ_TARGET` carries the destination device. Exit status 0 counts
//! as a successful dispatch.

use std::process::{Command, Stdio};

use rq_core::{RemoteClient, RemoteError, RemoteResult};

use crate::config::RemoteCommands;

/// [`RemoteClient`] that shells out to configured commands.
pub struct ShellRemote {
    commands: RemoteCommands,
}

impl ShellRemote {
    pub fn new(commands: RemoteCommands) -> Self {
        ShellRemote { commands }
    }

    fn dispatch(&self, op: &str, script: Option<&str>, command: &str, target: Option<&str>) -> RemoteResult {
        let Some(script) = script else {
            return Err(RemoteError::new(format!(
                "no '{op}' command configured in [remote]"
            )));
        };

        let mut child = Command::new("sh");
        child
            .arg("-c")
            .arg(script)
            .env("RELAYQ_COMMAND", command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(target) = target {
            child.env("RELAYQ_TARGET", target);
        }

        let status = child
            .status()
            .map_err(|e| RemoteError::new(format!("failed to run '{op}' command: {e}")))?;

        Ok(status.success())
    }
}

impl RemoteClient for ShellRemote {
    fn is_available(&self) -> bool {
        // No probe configured means we never claim availability
        let Some(probe) = self.commands.probe.as_deref() else {
            return false;
        };

        Command::new("sh")
            .arg("-c")
            .arg(probe)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn route_command(&self, target_device: &str, command: &str) -> RemoteResult {
        self.dispatch(
            "route",
            self.commands.route.as_deref(),
            command,
            Some(target_device),
        )
    }

    fn execute_cloud_meta(&self, command: &str) -> RemoteResult {
        self.dispatch("meta", self.commands.meta.as_deref(), command, None)
    }

    fn log_command_history(&self, command: &str) -> RemoteResult {
        self.dispatch("history", self.commands.history.as_deref(), command, None)
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
