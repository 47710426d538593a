// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake sink for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use splice_core::LogEvent;

use crate::sink::{Sink, SinkError};

#[derive(Default)]
struct FakeSinkState {
    events: Vec<LogEvent>,
    flushes: usize,
    closed: bool,
}

/// Sink that records submitted events in memory
#[derive(Clone, Default)]
pub struct FakeSink {
    inner: Arc<Mutex<FakeSinkState>>,
}

impl FakeSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all submitted events
    pub fn events(&self) -> Vec<LogEvent> {
        self.inner.lock().events.clone()
    }

    pub fn flushes(&self) -> usize {
        self.inner.lock().flushes
    }

    /// Make every later submit fail with `SinkError::Closed`
    pub fn close(&self) {
        self.inner.lock().closed = true;
    }
}

#[async_trait]
impl Sink for FakeSink {
    fn submit(&self, event: LogEvent) -> Result<(), SinkError> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(SinkError::Closed);
        }
        inner.events.push(event);
        Ok(())
    }

    async fn flush(&self) -> Result<(), SinkError> {
        self.inner.lock().flushes += 1;
        Ok(())
    }
}
