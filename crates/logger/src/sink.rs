// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Where loggers send finished events.

use async_trait::async_trait;
use splice_core::LogEvent;
use splice_daemon::{EnqueueError, WriterHandle};
use thiserror::Error;

use crate::client::ClientError;

/// Errors from submitting or flushing events
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("log queue is full")]
    QueueFull,

    #[error("log sink is closed")]
    Closed,

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl From<EnqueueError> for SinkError {
    fn from(e: EnqueueError) -> Self {
        match e {
            EnqueueError::QueueFull => SinkError::QueueFull,
            EnqueueError::Closed => SinkError::Closed,
        }
    }
}

/// Destination for log events.
///
/// `submit` never waits on file or socket I/O; it only queues.
#[async_trait]
pub trait Sink: Send + Sync {
    fn submit(&self, event: LogEvent) -> Result<(), SinkError>;

    /// Resolve once every event submitted before the call has been written.
    async fn flush(&self) -> Result<(), SinkError>;
}

/// In-process sink: straight onto the writer queue.
#[async_trait]
impl Sink for WriterHandle {
    fn submit(&self, event: LogEvent) -> Result<(), SinkError> {
        Ok(self.enqueue(event)?)
    }

    async fn flush(&self) -> Result<(), SinkError> {
        Ok(self.barrier().await?)
    }
}
