// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared crate for CLI specs. The actual specs live under `cli/` and are
//! wired up as `[[test]]` targets of the `relayq` crate.
