// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the facade crate.

use std::path::PathBuf;

/// Daemon socket: SPLICE_SOCKET > <state dir>/daemon.sock
pub fn socket_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("SPLICE_SOCKET") {
        return Some(PathBuf::from(path));
    }
    splice_daemon::env::state_dir().map(|dir| dir.join("daemon.sock"))
}

/// Console side channel is on unless SPLICE_CONSOLE=0
pub fn console_enabled() -> bool {
    !matches!(
        std::env::var("SPLICE_CONSOLE").as_deref().map(str::trim),
        Ok("0") | Ok("false") | Ok("off")
    )
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
