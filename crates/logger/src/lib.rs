// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! splice: structured logging into JSON-array files
//!
//! Many threads, tasks or processes can log to the same file; every record
//! goes through one writer, so the file is always a valid JSON array.
//!
//! In one process, use [`Registry::local`]. Across processes, run `spliced`
//! and use [`Registry::connect`].

mod client;
mod env;
mod logger;
mod macros;
mod registry;
mod sink;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeSink;

pub use client::{ClientError, DaemonClient, DaemonSink, DaemonStatus, DEFAULT_LOCAL_CAPACITY};
pub use logger::{LogError, Logger};
pub use registry::Registry;
pub use sink::{Sink, SinkError};

pub use splice_core::{
    format_record, function_name, CallSite, ConsoleFormatter, Fields, FormatError, Level, LogEvent,
};
pub use splice_daemon::{WriterConfig, WriterHandle};
pub use splice_storage::{AppendOptions, CorruptPolicy, SyncMode};
