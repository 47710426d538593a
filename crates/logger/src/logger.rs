// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-target logger with one method per severity.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use splice_core::{CallSite, ConsoleFormatter, Fields, FormatError, Level, LogEvent};
use thiserror::Error;

use crate::sink::{Sink, SinkError};

/// Errors returned to the code that made a log call
#[derive(Debug, Error)]
pub enum LogError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Writes every record to a fixed, ordered set of files.
///
/// Cheap to share: obtain one from [`crate::Registry::logger`] and clone the
/// `Arc`. All methods take `&self`.
pub struct Logger {
    targets: Vec<PathBuf>,
    namespace: Option<String>,
    fields: RwLock<Fields>,
    sink: Arc<dyn Sink>,
    console: Option<ConsoleFormatter>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("targets", &self.targets)
            .field("namespace", &self.namespace)
            .field("fields", &*self.fields.read())
            .finish_non_exhaustive()
    }
}

impl Logger {
    pub fn new(
        targets: Vec<PathBuf>,
        namespace: Option<String>,
        sink: Arc<dyn Sink>,
        console: Option<ConsoleFormatter>,
    ) -> Self {
        Self {
            targets,
            namespace: namespace.filter(|ns| !ns.is_empty()),
            fields: RwLock::new(Fields::new()),
            sink,
            console,
        }
    }

    pub fn targets(&self) -> &[PathBuf] {
        &self.targets
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Attach a field to every later record from this logger.
    pub fn bind<T: Serialize + ?Sized>(
        &self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<(), LogError> {
        self.fields.write().insert(key, value)?;
        Ok(())
    }

    /// Copy of the fields attached with [`Logger::bind`].
    pub fn bound_fields(&self) -> Fields {
        self.fields.read().clone()
    }

    /// Build one event for all targets, echo it to the console, then submit it.
    ///
    /// `fields` override bound fields with the same key.
    pub fn log(
        &self,
        level: Level,
        message: impl Into<String>,
        call_site: Option<CallSite>,
        fields: Fields,
    ) -> Result<(), LogError> {
        let mut merged = self.fields.read().clone();
        merged.merge(&fields);

        let mut event =
            LogEvent::new(self.targets.iter().cloned(), level, message).with_fields(merged);
        if let Some(site) = call_site {
            event = event.with_call_site(site);
        }
        if let Some(namespace) = &self.namespace {
            event = event.with_namespace(namespace.clone());
        }

        if let Some(console) = &self.console {
            console.emit(&event);
        }
        self.sink.submit(event)?;
        Ok(())
    }

    pub fn debug(
        &self,
        message: impl Into<String>,
        call_site: Option<CallSite>,
        fields: Fields,
    ) -> Result<(), LogError> {
        self.log(Level::Debug, message, call_site, fields)
    }

    pub fn info(
        &self,
        message: impl Into<String>,
        call_site: Option<CallSite>,
        fields: Fields,
    ) -> Result<(), LogError> {
        self.log(Level::Info, message, call_site, fields)
    }

    pub fn success(
        &self,
        message: impl Into<String>,
        call_site: Option<CallSite>,
        fields: Fields,
    ) -> Result<(), LogError> {
        self.log(Level::Success, message, call_site, fields)
    }

    pub fn warning(
        &self,
        message: impl Into<String>,
        call_site: Option<CallSite>,
        fields: Fields,
    ) -> Result<(), LogError> {
        self.log(Level::Warning, message, call_site, fields)
    }

    pub fn error(
        &self,
        message: impl Into<String>,
        call_site: Option<CallSite>,
        fields: Fields,
    ) -> Result<(), LogError> {
        self.log(Level::Error, message, call_site, fields)
    }

    pub fn critical(
        &self,
        message: impl Into<String>,
        call_site: Option<CallSite>,
        fields: Fields,
    ) -> Result<(), LogError> {
        self.log(Level::Critical, message, call_site, fields)
    }

    /// Wait until everything this process submitted has been written.
    pub async fn flush(&self) -> Result<(), LogError> {
        Ok(self.sink.flush().await?)
    }
}

#[cfg(test)]
#[path = "logger_tests.rs"]
mod tests;
