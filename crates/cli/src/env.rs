// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access, grounded on `oj`'s `env.rs`
//! (one function per variable, no direct `std::env::var` calls elsewhere
//! in the crate).

/// Overrides the path to the `migrd` binary `migrctl run` launches.
/// Falls back to discovering a sibling `migrd` next to the current
/// executable, matching `oj`'s `OJ_DAEMON_BINARY` / sibling-binary lookup.
pub fn daemon_binary() -> Option<String> {
    std::env::var("MIGRD_BINARY").ok().filter(|v| !v.is_empty())
}
