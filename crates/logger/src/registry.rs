// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logger cache keyed by target set and namespace.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexSet;
use parking_lot::Mutex;
use splice_core::{CallSite, ConsoleFormatter, Fields, Level};
use splice_daemon::{ConsoleFallback, Writer, WriterConfig};

use crate::client::{ClientError, DaemonSink};
use crate::env;
use crate::logger::{LogError, Logger};
use crate::sink::Sink;

type LoggerKey = (Vec<PathBuf>, String);

/// Hands out one shared [`Logger`] per (ordered target set, namespace).
///
/// Every logger from one registry submits to the same sink, so all of them
/// funnel into a single writer.
pub struct Registry {
    sink: Arc<dyn Sink>,
    console: Option<ConsoleFormatter>,
    loggers: Mutex<HashMap<LoggerKey, Arc<Logger>>>,
}

impl Registry {
    /// Registry over an existing sink. The console side channel follows
    /// `SPLICE_CONSOLE`.
    pub fn new(sink: Arc<dyn Sink>) -> Self {
        let console = env::console_enabled().then(ConsoleFormatter::new);
        Self {
            sink,
            console,
            loggers: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the console side channel for loggers created from now on.
    pub fn with_console(mut self, console: Option<ConsoleFormatter>) -> Self {
        self.console = console;
        self
    }

    /// Registry backed by a writer task in this process.
    ///
    /// Must be called from within a tokio runtime.
    pub fn local(config: WriterConfig) -> Self {
        let (writer, handle) = Writer::new(config, ConsoleFallback::new(ConsoleFormatter::new()));
        writer.spawn();
        Self::new(Arc::new(handle))
    }

    /// Registry backed by a running `spliced` at `socket_path`.
    pub async fn connect(socket_path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let sink = DaemonSink::connect(socket_path).await?;
        Ok(Self::new(Arc::new(sink)))
    }

    /// [`Registry::connect`] to the socket named by the environment.
    pub async fn connect_default() -> Result<Self, ClientError> {
        let socket_path = env::socket_path().ok_or(ClientError::NoSocketPath)?;
        Self::connect(socket_path).await
    }

    pub fn sink(&self) -> &Arc<dyn Sink> {
        &self.sink
    }

    /// Cached logger for `paths` (duplicates dropped, order kept).
    ///
    /// An empty `namespace` means none.
    pub fn logger<I, P>(&self, paths: I, namespace: &str) -> Arc<Logger>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let targets: IndexSet<PathBuf> = paths.into_iter().map(Into::into).collect();
        let key = (targets.into_iter().collect::<Vec<_>>(), namespace.to_string());

        let mut loggers = self.loggers.lock();
        if let Some(logger) = loggers.get(&key) {
            return Arc::clone(logger);
        }
        let logger = Arc::new(Logger::new(
            key.0.clone(),
            Some(key.1.clone()),
            Arc::clone(&self.sink),
            self.console,
        ));
        loggers.insert(key, Arc::clone(&logger));
        logger
    }

    /// Log once to an ad hoc set of files.
    pub fn write<I, P>(
        &self,
        paths: I,
        level: Level,
        message: impl Into<String>,
        call_site: Option<CallSite>,
        fields: Fields,
    ) -> Result<(), LogError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.logger(paths, "").log(level, message, call_site, fields)
    }

    pub fn len(&self) -> usize {
        self.loggers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.lock().is_empty()
    }

    /// Wait until every event submitted through this registry is written.
    pub async fn flush(&self) -> Result<(), LogError> {
        Ok(self.sink.flush().await?)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
