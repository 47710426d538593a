// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical JSON text for one log record.
//!
//! The output is a single compact object with no trailing newline and no
//! surrounding brackets or commas; the appender owns the array syntax.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::event::LogEvent;

/// Errors raised while turning an event into JSON.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("field `{key}` is not representable as JSON: {source}")]
    Unserializable {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("field `{key}` holds {number}, which JSON cannot represent")]
    NonFinite { key: String, number: f64 },

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Format a record timestamp: RFC 3339, UTC, millisecond precision.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Render `event` as one JSON object.
///
/// Key order: `message`, `level`, `timestamp`, `process_id`, `namespace`,
/// call-site keys, then extra fields. An extra field with the same name as a
/// default key replaces its value in place.
pub fn format_record(event: &LogEvent) -> Result<String, FormatError> {
    let mut record = Map::new();
    record.insert("message".into(), Value::String(event.message().to_string()));
    record.insert("level".into(), Value::String(event.level().as_str().into()));
    record.insert(
        "timestamp".into(),
        Value::String(format_timestamp(event.timestamp())),
    );
    record.insert("process_id".into(), Value::from(event.process_id()));

    if let Some(namespace) = event.namespace() {
        record.insert("namespace".into(), Value::String(namespace.to_string()));
    }

    if let Some(site) = event.call_site() {
        record.insert("module".into(), Value::String(site.module.clone()));
        record.insert("function".into(), Value::String(site.function.clone()));
        record.insert("file".into(), Value::String(site.file.clone()));
        record.insert("line".into(), Value::from(site.line));
    }

    for (key, value) in event.fields().iter() {
        record.insert(key.clone(), value.clone());
    }

    Ok(serde_json::to_string(&Value::Object(record))?)
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
