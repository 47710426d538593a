// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use splice_storage::{CorruptPolicy, SyncMode};

/// Resolve state directory: SPLICE_STATE_DIR > XDG_STATE_HOME/splice > ~/.local/state/splice
pub fn state_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("SPLICE_STATE_DIR") {
        return Some(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Some(PathBuf::from(xdg).join("splice"));
    }
    dirs::home_dir().map(|home| home.join(".local/state/splice"))
}

/// Writer queue capacity override
pub fn queue_capacity() -> Option<usize> {
    std::env::var("SPLICE_QUEUE_CAPACITY")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
}

/// Idle sweep interval override
pub fn idle_interval() -> Option<Duration> {
    std::env::var("SPLICE_IDLE_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// `SPLICE_FSYNC=0` (or `false`) skips fdatasync after each record
pub fn sync_mode() -> Option<SyncMode> {
    std::env::var("SPLICE_FSYNC").ok().map(|v| {
        if is_off(&v) {
            SyncMode::Flush
        } else {
            SyncMode::Fsync
        }
    })
}

/// What to do with a corrupt log file: `fail` or `rotate`
pub fn corrupt_policy() -> Option<CorruptPolicy> {
    let value = std::env::var("SPLICE_ON_CORRUPT").ok()?;
    match value.parse() {
        Ok(policy) => Some(policy),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring SPLICE_ON_CORRUPT");
            None
        }
    }
}

/// `SPLICE_CREATE_DIRS=0` disables parent directory creation
pub fn create_dirs() -> Option<bool> {
    std::env::var("SPLICE_CREATE_DIRS").ok().map(|v| !is_off(&v))
}

fn is_off(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
