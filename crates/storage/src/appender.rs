// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Incremental JSON-array appender.
//!
//! Each target file holds one JSON array. A new record is spliced in by
//! overwriting the closing `]` with `,<record>]`, so an append costs the same
//! no matter how large the file has grown. The whole file is never read.
//!
//! The appender is not synchronized. It must be owned by a single writer.

use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, warn};

use crate::backup::rotate_bak_path;
use crate::identity::{inspect, FileState, FileStatus};

/// Bytes read per step when scanning backwards for the closing bracket
const SCAN_CHUNK: usize = 64;

/// Errors that can occur while appending a record
#[derive(Debug, Error)]
pub enum AppendError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupt JSON array in {}: {reason}", path.display())]
    CorruptArray { path: PathBuf, reason: String },

    #[error("refusing to append an empty record to {}", path.display())]
    EmptyRecord { path: PathBuf },
}

impl AppendError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_owned(),
            source,
        }
    }

    /// Target file the failed append was addressed to.
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::CorruptArray { path, .. } | Self::EmptyRecord { path } => {
                path
            }
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::CorruptArray { .. })
    }
}

/// Failure inside the file surgery, before the path is attached.
#[derive(Debug, Error)]
pub enum Fault {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("corrupt JSON array: {0}")]
    Corrupt(String),
}

impl Fault {
    fn at(self, path: &Path) -> AppendError {
        match self {
            Fault::Io(source) => AppendError::io(path, source),
            Fault::Corrupt(reason) => AppendError::CorruptArray {
                path: path.to_owned(),
                reason,
            },
        }
    }
}

/// What to do with a file whose contents are not an array we can extend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptPolicy {
    /// Report `CorruptArray` on every attempt and leave the file untouched.
    #[default]
    Fail,
    /// Move the file to `<path>.bak` and start a new array.
    Rotate,
}

impl fmt::Display for CorruptPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorruptPolicy::Fail => f.write_str("fail"),
            CorruptPolicy::Rotate => f.write_str("rotate"),
        }
    }
}

impl FromStr for CorruptPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(CorruptPolicy::Fail),
            "rotate" => Ok(CorruptPolicy::Rotate),
            other => Err(format!("unknown corrupt policy: {other}")),
        }
    }
}

/// Durability step after each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// `fdatasync` after every record
    #[default]
    Fsync,
    /// Hand the bytes to the kernel only
    Flush,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendOptions {
    pub sync: SyncMode,
    pub on_corrupt: CorruptPolicy,
    /// Create missing parent directories before opening a target.
    pub create_dirs: bool,
}

impl Default for AppendOptions {
    fn default() -> Self {
        Self {
            sync: SyncMode::Fsync,
            on_corrupt: CorruptPolicy::Fail,
            create_dirs: true,
        }
    }
}

/// Appends records to JSON-array files, one [`FileState`] per target.
#[derive(Debug, Default)]
pub struct JsonArrayAppender {
    files: HashMap<PathBuf, FileState>,
    options: AppendOptions,
}

impl JsonArrayAppender {
    pub fn new(options: AppendOptions) -> Self {
        Self {
            files: HashMap::new(),
            options,
        }
    }

    pub fn options(&self) -> &AppendOptions {
        &self.options
    }

    pub fn state(&self, path: &Path) -> Option<&FileState> {
        self.files.get(path)
    }

    /// Number of targets with an open handle.
    pub fn open_files(&self) -> usize {
        self.files.values().filter(|s| s.is_open()).count()
    }

    /// Append one record (a JSON object's text) to the array at `path`.
    ///
    /// Returns how the record was written: `Fresh` when it opened a new
    /// array, `Continuing` when it extended an existing one.
    pub fn append(&mut self, path: &Path, record: &str) -> Result<FileStatus, AppendError> {
        if record.trim().is_empty() {
            return Err(AppendError::EmptyRecord {
                path: path.to_owned(),
            });
        }

        let options = self.options;
        let state = self
            .files
            .entry(path.to_path_buf())
            .or_insert_with(|| FileState::new(path));

        let mut status = inspect(path, Some(state));
        if status == FileStatus::Rotated {
            debug!(path = %path.display(), "log file replaced or removed, reopening");
            if let Some(stale) = state.detach() {
                // The old object may already be unlinked; nothing to report.
                let _ = sync(&stale, options.sync);
            }
            status = inspect(path, None);
        }

        match apply(state, status, record, &options) {
            Ok(()) => Ok(status),
            Err(e) if e.is_corrupt() && options.on_corrupt == CorruptPolicy::Rotate => {
                let bak = quarantine(state)?;
                warn!(
                    path = %path.display(),
                    bak = %bak.display(),
                    error = %e,
                    "corrupt JSON array moved aside, starting a new one",
                );
                apply(state, FileStatus::Fresh, record, &options)?;
                Ok(FileStatus::Fresh)
            }
            Err(e) => {
                // Reopen on the next attempt instead of trusting this handle.
                state.detach();
                Err(e)
            }
        }
    }

    /// Close handles whose path was removed or now names a different file.
    ///
    /// Returns the number of handles closed. Called while idle so that a
    /// rotated file is released even when no new records arrive for it.
    pub fn sweep(&mut self) -> usize {
        let mut closed = 0;
        for state in self.files.values_mut().filter(|s| s.is_open()) {
            if inspect(state.path(), Some(state)) == FileStatus::Rotated {
                debug!(path = %state.path().display(), "releasing handle to rotated log file");
                state.detach();
                closed += 1;
            }
        }
        closed
    }

    /// Sync and close the handle for `path`, if one is open.
    pub fn close(&mut self, path: &Path) -> Result<(), AppendError> {
        let Some(file) = self.files.get_mut(path).and_then(FileState::detach) else {
            return Ok(());
        };
        sync(&file, self.options.sync).map_err(|e| AppendError::io(path, e))
    }

    /// Sync and close every open handle, returning how many were closed.
    pub fn close_all(&mut self) -> usize {
        let mut closed = 0;
        for state in self.files.values_mut() {
            if let Some(file) = state.detach() {
                if let Err(e) = sync(&file, self.options.sync) {
                    warn!(path = %state.path().display(), error = %e, "failed to sync log file on close");
                }
                closed += 1;
            }
        }
        closed
    }
}

fn apply(
    state: &mut FileState,
    status: FileStatus,
    record: &str,
    options: &AppendOptions,
) -> Result<(), AppendError> {
    let path = state.path().to_path_buf();
    let file = ensure_open(state, options)?;
    let new_len = match status {
        FileStatus::Fresh => write_fresh(file, record).map_err(|e| AppendError::io(&path, e))?,
        FileStatus::Continuing | FileStatus::Rotated => {
            splice_record(file, record).map_err(|f| f.at(&path))?
        }
    };
    sync(file, options.sync).map_err(|e| AppendError::io(&path, e))?;
    state.set_size(new_len);
    Ok(())
}

fn ensure_open<'a>(
    state: &'a mut FileState,
    options: &AppendOptions,
) -> Result<&'a mut File, AppendError> {
    let path = state.path().to_path_buf();
    if !state.is_open() {
        let file = open_target(&path, options).map_err(|e| AppendError::io(&path, e))?;
        return state.attach(file).map_err(|e| AppendError::io(&path, e));
    }
    state
        .handle_mut()
        .ok_or_else(|| AppendError::io(&path, io::Error::other("log file handle missing")))
}

fn open_target(path: &Path, options: &AppendOptions) -> io::Result<File> {
    if options.create_dirs {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
}

fn sync(file: &File, mode: SyncMode) -> io::Result<()> {
    match mode {
        SyncMode::Fsync => file.sync_data(),
        SyncMode::Flush => {
            let mut file = file;
            file.flush()
        }
    }
}

/// Move a corrupt file aside, returning the backup path.
fn quarantine(state: &mut FileState) -> Result<PathBuf, AppendError> {
    state.detach();
    let path = state.path().to_path_buf();
    let bak = rotate_bak_path(&path).map_err(|e| AppendError::io(&path, e))?;
    fs::rename(&path, &bak).map_err(|e| AppendError::io(&path, e))?;
    Ok(bak)
}

/// Start a new array holding only `record`. Returns the new file length.
///
/// The array is written with a single `write_all` at offset 0 and the file
/// is cut to that length.
pub fn write_fresh(file: &mut File, record: &str) -> io::Result<u64> {
    let mut buf = Vec::with_capacity(record.len() + 2);
    buf.push(b'[');
    buf.extend_from_slice(record.as_bytes());
    buf.push(b']');

    file.seek(SeekFrom::Start(0))?;
    file.write_all(&buf)?;
    let len = buf.len() as u64;
    file.set_len(len)?;
    Ok(len)
}

/// Insert `record` as the last element of the array in `file`.
///
/// Only the first byte and the tail are read. Trailing whitespace after the
/// closing bracket is tolerated and dropped. An empty file gets a new array.
/// Returns the new file length.
pub fn splice_record(file: &mut File, record: &str) -> Result<u64, Fault> {
    let len = file.seek(SeekFrom::End(0))?;
    if len == 0 {
        return Ok(write_fresh(file, record)?);
    }

    let mut head = [0u8; 1];
    file.seek(SeekFrom::Start(0))?;
    file.read_exact(&mut head)?;
    if head[0] != b'[' {
        return Err(Fault::Corrupt(format!(
            "expected '[' at offset 0, found {}",
            describe(head[0])
        )));
    }

    // Offset 0 holds '[', so a significant byte always exists
    let (close_pos, close) = last_significant_byte(file, len)?
        .ok_or_else(|| Fault::Corrupt("no closing bracket".to_string()))?;
    if close != b']' {
        return Err(Fault::Corrupt(format!(
            "expected ']' at offset {close_pos}, found {}",
            describe(close)
        )));
    }
    if close_pos == 0 {
        return Err(Fault::Corrupt("array has no opening bracket".to_string()));
    }

    let (_, before) = last_significant_byte(file, close_pos)?
        .ok_or_else(|| Fault::Corrupt("array has no opening bracket".to_string()))?;
    let separator: &[u8] = match before {
        b'[' => b"",
        b',' => return Err(Fault::Corrupt("dangling ',' before ']'".to_string())),
        _ => b",",
    };

    let mut buf = Vec::with_capacity(separator.len() + record.len() + 1);
    buf.extend_from_slice(separator);
    buf.extend_from_slice(record.as_bytes());
    buf.push(b']');

    file.seek(SeekFrom::Start(close_pos))?;
    file.write_all(&buf)?;
    let new_len = close_pos + buf.len() as u64;
    if new_len < len {
        file.set_len(new_len)?;
    }
    Ok(new_len)
}

/// Find the last non-whitespace byte before `end`, scanning backwards.
fn last_significant_byte(file: &mut File, end: u64) -> io::Result<Option<(u64, u8)>> {
    let mut chunk = [0u8; SCAN_CHUNK];
    let mut end = end;
    while end > 0 {
        let start = end.saturating_sub(SCAN_CHUNK as u64);
        let n = (end - start) as usize;
        file.seek(SeekFrom::Start(start))?;
        file.read_exact(&mut chunk[..n])?;
        if let Some(i) = chunk[..n].iter().rposition(|b| !b.is_ascii_whitespace()) {
            return Ok(Some((start + i as u64, chunk[i])));
        }
        end = start;
    }
    Ok(None)
}

fn describe(byte: u8) -> String {
    format!("'{}'", (byte as char).escape_default())
}

#[cfg(test)]
#[path = "appender_tests.rs"]
mod tests;
