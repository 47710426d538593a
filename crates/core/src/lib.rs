// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! splice-core: log events, levels and the canonical record format

pub mod call_site;
pub mod console;
mod env;
pub mod event;
mod finite;
pub mod level;
pub mod record;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use call_site::{function_name, CallSite};
pub use console::ConsoleFormatter;
pub use event::{Fields, LogEvent};
pub use level::{Level, UnknownLevel};
pub use record::{format_record, format_timestamp, FormatError};
