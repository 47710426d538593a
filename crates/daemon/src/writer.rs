// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-serialization actor.
//!
//! Producers hold a [`WriterHandle`] and only ever enqueue. A single
//! [`Writer`] task drains the queue in FIFO order and is the only code that
//! touches log files, so writes to one file never interleave.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use splice_core::{format_record, LogEvent};
use splice_storage::{AppendOptions, JsonArrayAppender};
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::env;
use crate::fallback::Fallback;

/// Default queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Default wait before an idle writer sweeps for rotated files
pub const DEFAULT_IDLE_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterConfig {
    pub queue_capacity: usize,
    pub idle_interval: Duration,
    pub append: AppendOptions,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            idle_interval: DEFAULT_IDLE_INTERVAL,
            append: AppendOptions::default(),
        }
    }
}

impl WriterConfig {
    /// Defaults overridden by `SPLICE_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            queue_capacity: env::queue_capacity().unwrap_or(defaults.queue_capacity),
            idle_interval: env::idle_interval().unwrap_or(defaults.idle_interval),
            append: AppendOptions {
                sync: env::sync_mode().unwrap_or(defaults.append.sync),
                on_corrupt: env::corrupt_policy().unwrap_or(defaults.append.on_corrupt),
                create_dirs: env::create_dirs().unwrap_or(defaults.append.create_dirs),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EnqueueError {
    #[error("writer queue is full")]
    QueueFull,

    #[error("writer has stopped")]
    Closed,
}

enum Command {
    Log(LogEvent),
    Barrier(oneshot::Sender<()>),
}

#[derive(Debug, Default)]
struct Counters {
    records_written: AtomicU64,
    write_failures: AtomicU64,
}

/// Point-in-time writer counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriterStats {
    /// Records appended, counted once per target file
    pub records_written: u64,
    /// Records lost to format or append errors, counted per target
    pub write_failures: u64,
    /// Commands waiting in the queue
    pub queued: usize,
}

/// Producer side of the writer queue. Cheap to clone.
#[derive(Clone)]
pub struct WriterHandle {
    tx: mpsc::Sender<Command>,
    counters: Arc<Counters>,
}

impl std::fmt::Debug for WriterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriterHandle")
            .field("stats", &self.stats())
            .finish()
    }
}

impl WriterHandle {
    /// Queue an event without waiting.
    pub fn enqueue(&self, event: LogEvent) -> Result<(), EnqueueError> {
        self.tx.try_send(Command::Log(event)).map_err(|e| match e {
            TrySendError::Full(_) => EnqueueError::QueueFull,
            TrySendError::Closed(_) => EnqueueError::Closed,
        })
    }

    /// Queue an event, waiting for room.
    pub async fn enqueue_wait(&self, event: LogEvent) -> Result<(), EnqueueError> {
        self.tx
            .send(Command::Log(event))
            .await
            .map_err(|_| EnqueueError::Closed)
    }

    /// Queue an event from a plain thread, blocking for room.
    ///
    /// Must not be called from inside an async context.
    pub fn blocking_enqueue(&self, event: LogEvent) -> Result<(), EnqueueError> {
        self.tx
            .blocking_send(Command::Log(event))
            .map_err(|_| EnqueueError::Closed)
    }

    /// Resolve once every command queued before this call has been applied.
    pub async fn barrier(&self) -> Result<(), EnqueueError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(Command::Barrier(done_tx))
            .await
            .map_err(|_| EnqueueError::Closed)?;
        done_rx.await.map_err(|_| EnqueueError::Closed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub fn stats(&self) -> WriterStats {
        WriterStats {
            records_written: self.counters.records_written.load(Ordering::Relaxed),
            write_failures: self.counters.write_failures.load(Ordering::Relaxed),
            queued: self.tx.max_capacity() - self.tx.capacity(),
        }
    }
}

/// The single consumer. Owns the appender and every open log file.
pub struct Writer {
    rx: mpsc::Receiver<Command>,
    appender: JsonArrayAppender,
    fallback: Box<dyn Fallback>,
    idle_interval: Duration,
    counters: Arc<Counters>,
}

impl Writer {
    pub fn new(config: WriterConfig, fallback: impl Fallback) -> (Self, WriterHandle) {
        // A zero-capacity tokio channel is not allowed
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let counters = Arc::new(Counters::default());
        let writer = Self {
            rx,
            appender: JsonArrayAppender::new(config.append),
            fallback: Box::new(fallback),
            idle_interval: config.idle_interval,
            counters: Arc::clone(&counters),
        };
        (writer, WriterHandle { tx, counters })
    }

    /// Spawn [`Writer::run`] on the current tokio runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Drain the queue until every handle is dropped, then close all files.
    pub async fn run(mut self) {
        debug!(idle_ms = self.idle_interval.as_millis() as u64, "writer started");
        loop {
            match tokio::time::timeout(self.idle_interval, self.rx.recv()).await {
                Ok(Some(Command::Log(event))) => self.write(&event),
                Ok(Some(Command::Barrier(done))) => {
                    // The waiter may have given up
                    let _ = done.send(());
                }
                Ok(None) => break,
                Err(_) => {
                    let closed = self.appender.sweep();
                    if closed > 0 {
                        debug!(closed, "released rotated log files");
                    }
                }
            }
        }

        let closed = self.appender.close_all();
        info!(
            closed,
            records_written = self.counters.records_written.load(Ordering::Relaxed),
            "writer stopped"
        );
    }

    fn write(&mut self, event: &LogEvent) {
        let record = match format_record(event) {
            Ok(record) => record,
            Err(e) => {
                self.counters
                    .write_failures
                    .fetch_add(event.targets().len() as u64, Ordering::Relaxed);
                self.fallback.format_failed(event, &e);
                return;
            }
        };

        for path in event.targets() {
            match self.appender.append(path, &record) {
                Ok(_) => {
                    self.counters.records_written.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    self.counters.write_failures.fetch_add(1, Ordering::Relaxed);
                    self.fallback.write_failed(event, path, &e);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
