// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol between producers and the `spliced` daemon.
//!
//! Each request and response travels as one length-prefixed JSON frame.

use serde::{Deserialize, Serialize};
use splice_core::LogEvent;

#[path = "protocol_wire.rs"]
mod wire;
pub use wire::{
    decode, encode, read_frame, recv, send, write_frame, ProtocolError, DEFAULT_TIMEOUT,
    MAX_MESSAGE_SIZE, PROTOCOL_VERSION,
};

/// Request from a producer to the daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Version handshake
    Hello { version: String },

    /// Queue one event for the writer
    Log { event: LogEvent },

    /// Wait until everything queued so far has been written
    Flush,

    /// Get daemon status
    Status,

    /// Request daemon shutdown
    Shutdown,
}

/// Response from the daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success
    Ok,

    /// Health check response
    Pong,

    /// Version handshake response
    Hello { version: String },

    /// Every event queued before the flush has been applied
    Flushed,

    /// Daemon status
    Status {
        uptime_secs: u64,
        records_written: u64,
        write_failures: u64,
        #[serde(default)]
        queued: usize,
    },

    /// The writer queue stayed full for the whole request timeout
    QueueFull,

    /// Error response
    Error { message: String },

    /// Daemon is shutting down
    ShuttingDown,
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
