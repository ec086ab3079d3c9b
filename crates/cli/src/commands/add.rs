// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use rq_core::{CommandType, Metadata};

use crate::commands::open_queue;
use crate::error::{Error, Result};

pub fn run(command: &str, command_type: &str, target: Option<&str>, meta: &[String]) -> Result<()> {
    let command_type: CommandType = command_type.parse().map_err(Error::Core)?;
    let metadata = parse_metadata(meta)?;

    let (queue, _, _) = open_queue()?;
    let id = queue.enqueue(command, command_type, target, metadata)?;

    println!("Queued #{} ({})", id, command_type);
    Ok(())
}

/// Parse repeated `key=value` arguments into a metadata map.
///
/// Values are stored as JSON strings; callers needing structure can encode
/// JSON in the value themselves.
fn parse_metadata(pairs: &[String]) -> Result<Option<Metadata>> {
    if pairs.is_empty() {
        return Ok(None);
    }

    let mut metadata = Metadata::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(Error::InvalidMetadata(pair.clone()));
        };
        if key.is_empty() {
            return Err(Error::InvalidMetadata(pair.clone()));
        }
        metadata.insert(key.to_string(), serde_json::Value::String(value.to_string()));
    }
    Ok(Some(metadata))
}

#[cfg(test)]
#[path = "add_tests.rs"]
mod tests;
