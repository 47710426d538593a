// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! splice daemon library
//!
//! Hosts the single writer that owns every log file, the IPC protocol used
//! by out-of-process producers, and the socket listener that feeds the
//! writer. The `spliced` binary wires these together.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod env;
pub mod fallback;
pub mod listener;
pub mod protocol;
pub mod writer;

pub use fallback::{ConsoleFallback, Fallback};
pub use listener::{Listener, ENQUEUE_WAIT};
pub use protocol::{Request, Response, DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE, PROTOCOL_VERSION};
pub use writer::{EnqueueError, Writer, WriterConfig, WriterHandle, WriterStats};
