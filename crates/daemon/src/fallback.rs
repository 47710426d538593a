// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Where the writer reports records it could not persist.

use std::path::Path;

use splice_core::{ConsoleFormatter, FormatError, LogEvent};
use splice_storage::AppendError;

/// Receives consumer-side failures. Never sees producer-side errors.
pub trait Fallback: Send + 'static {
    /// Appending `event` to `path` failed.
    fn write_failed(&mut self, event: &LogEvent, path: &Path, error: &AppendError);

    /// `event` could not be turned into a record; nothing was written.
    fn format_failed(&mut self, event: &LogEvent, error: &FormatError);
}

/// Default fallback: renders the lost record on stderr and traces the error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleFallback {
    console: ConsoleFormatter,
}

impl ConsoleFallback {
    pub fn new(console: ConsoleFormatter) -> Self {
        Self { console }
    }
}

impl Fallback for ConsoleFallback {
    fn write_failed(&mut self, event: &LogEvent, path: &Path, error: &AppendError) {
        tracing::error!(path = %path.display(), error = %error, "failed to append log record");
        self.console.emit(event);
    }

    fn format_failed(&mut self, event: &LogEvent, error: &FormatError) {
        tracing::error!(error = %error, "failed to format log record");
        self.console.emit(event);
    }
}
