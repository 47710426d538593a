// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! File layer for splice: JSON-array files that grow one record at a time

mod appender;
mod backup;
mod identity;

pub use appender::{
    splice_record, write_fresh, AppendError, AppendOptions, CorruptPolicy, Fault,
    JsonArrayAppender, SyncMode,
};
pub use backup::{rotate_bak_path, MAX_BAK_FILES};
pub use identity::{inspect, FileIdentity, FileState, FileStatus};
