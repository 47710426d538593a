// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use std::path::PathBuf;

use chrono::{TimeZone, Utc};

use crate::{CallSite, Fields, Level, LogEvent};

/// Fixed instant used by test events: 2026-01-30T08:14:09Z.
pub fn fixed_timestamp() -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(1_769_760_849, 0)
        .single()
        .unwrap_or_default()
}

// ── Event factory functions ─────────────────────────────────────────────────

pub fn event_for<P: Into<PathBuf>>(target: P, level: Level, message: &str) -> LogEvent {
    LogEvent::new([target.into()], level, message)
        .at(fixed_timestamp())
        .with_call_site(CallSite::new("tests", "event_for", "test_support.rs", 1))
}

pub fn info_event<P: Into<PathBuf>>(target: P, message: &str) -> LogEvent {
    event_for(target, Level::Info, message)
}

pub fn error_event<P: Into<PathBuf>>(target: P, message: &str) -> LogEvent {
    event_for(target, Level::Error, message)
}

/// An event tagged with a sequence number field, for ordering checks.
pub fn numbered_event<P: Into<PathBuf>>(target: P, seq: u64) -> LogEvent {
    let fields = Fields::from(serde_json::Map::from_iter([(
        "seq".to_string(),
        serde_json::Value::from(seq),
    )]));
    info_event(target, &format!("record {seq}")).with_fields(fields)
}
