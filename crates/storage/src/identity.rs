// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File identity tracking.
//!
//! Every write first stats the target path and compares it with the handle
//! the appender holds. This is how external rotation (rename, truncate,
//! delete) is noticed without any side channel.

use std::fs::{File, Metadata};
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

/// Filesystem object behind a path or handle: (device, inode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    pub device: u64,
    pub inode: u64,
}

impl FileIdentity {
    pub fn of(metadata: &Metadata) -> Self {
        Self {
            device: metadata.dev(),
            inode: metadata.ino(),
        }
    }
}

/// How the next record must be written to a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// Missing or empty: open a new array with this record as its only element.
    Fresh,
    /// Holds a non-empty array: splice the record in before the closing `]`.
    Continuing,
    /// The held handle no longer points at the file at this path. Close it
    /// and inspect again without cached state.
    Rotated,
}

/// Per-target state owned by the appender.
///
/// `identity` always describes the object `handle` points at; both are
/// `None` together when the file is closed.
#[derive(Debug)]
pub struct FileState {
    path: PathBuf,
    identity: Option<FileIdentity>,
    last_known_size: u64,
    handle: Option<File>,
}

impl FileState {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            identity: None,
            last_known_size: 0,
            handle: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn identity(&self) -> Option<FileIdentity> {
        self.identity
    }

    pub fn last_known_size(&self) -> u64 {
        self.last_known_size
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Adopt an opened handle, recording the identity of what it points at.
    pub(crate) fn attach(&mut self, handle: File) -> std::io::Result<&mut File> {
        let metadata = handle.metadata()?;
        self.identity = Some(FileIdentity::of(&metadata));
        self.last_known_size = metadata.len();
        Ok(self.handle.insert(handle))
    }

    pub(crate) fn handle_mut(&mut self) -> Option<&mut File> {
        self.handle.as_mut()
    }

    pub(crate) fn set_size(&mut self, size: u64) {
        self.last_known_size = size;
    }

    /// Drop the handle. Returns the handle so callers can sync it first.
    pub(crate) fn detach(&mut self) -> Option<File> {
        self.identity = None;
        self.handle.take()
    }
}

/// Classify the file at `path` against the cached state.
///
/// - stat fails: `Rotated` if a handle is held, otherwise `Fresh`
/// - identity differs from the held handle: `Rotated`
/// - size zero: `Fresh`
/// - otherwise: `Continuing`
pub fn inspect(path: &Path, cached: Option<&FileState>) -> FileStatus {
    let held = cached.and_then(|state| state.identity);

    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(_) => {
            return match held {
                Some(_) => FileStatus::Rotated,
                None => FileStatus::Fresh,
            };
        }
    };

    if let Some(identity) = held {
        if identity != FileIdentity::of(&metadata) {
            return FileStatus::Rotated;
        }
    }

    if metadata.len() == 0 {
        FileStatus::Fresh
    } else {
        FileStatus::Continuing
    }
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
