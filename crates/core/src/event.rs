// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log events and their extra fields.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::call_site::CallSite;
use crate::finite::find_non_finite;
use crate::level::Level;
use crate::record::FormatError;

/// Ordered extra fields attached to a record.
///
/// Values are converted to JSON on insertion, so a value that has no JSON
/// representation is rejected here, on the producer side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(Map<String, Value>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize `value` and store it under `key`, replacing any previous value.
    pub fn insert<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<(), FormatError> {
        let key = key.into();
        if let Some(number) = find_non_finite(value) {
            return Err(FormatError::NonFinite { key, number });
        }
        let value = serde_json::to_value(value).map_err(|source| FormatError::Unserializable {
            key: key.clone(),
            source,
        })?;
        self.0.insert(key, value);
        Ok(())
    }

    /// Builder form of [`Fields::insert`].
    pub fn with<T: Serialize + ?Sized>(
        mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<Self, FormatError> {
        self.insert(key, value)?;
        Ok(self)
    }

    /// Copy every entry of `other` into `self`; entries of `other` win.
    pub fn merge(&mut self, other: &Fields) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Fields {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A single log call, addressed to one or more files.
///
/// Built by the producer and handed to a sink; nothing mutates it afterwards.
/// The builder methods consume `self` and are meant to be chained right after
/// [`LogEvent::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    targets: Vec<PathBuf>,
    level: Level,
    message: String,
    #[serde(default, skip_serializing_if = "Fields::is_empty")]
    fields: Fields,
    timestamp: DateTime<Utc>,
    process_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    call_site: Option<CallSite>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
}

impl LogEvent {
    /// Create an event stamped with the current time and process id.
    ///
    /// Duplicate targets are dropped; the first occurrence keeps its position.
    pub fn new<I, P>(targets: I, level: Level, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let targets: IndexSet<PathBuf> = targets.into_iter().map(Into::into).collect();
        Self {
            targets: targets.into_iter().collect(),
            level,
            message: message.into(),
            fields: Fields::new(),
            timestamp: Utc::now(),
            process_id: std::process::id(),
            call_site: None,
            namespace: None,
        }
    }

    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_call_site(mut self, call_site: CallSite) -> Self {
        self.call_site = Some(call_site);
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.namespace = (!namespace.is_empty()).then_some(namespace);
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_process_id(mut self, process_id: u32) -> Self {
        self.process_id = process_id;
        self
    }

    pub fn targets(&self) -> &[PathBuf] {
        &self.targets
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn timestamp(&self) -> &DateTime<Utc> {
        &self.timestamp
    }

    pub fn process_id(&self) -> u32 {
        self.process_id
    }

    pub fn call_site(&self) -> Option<&CallSite> {
        self.call_site.as_ref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
