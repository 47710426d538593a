// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Numbered `.bak` paths for files moved aside after corruption.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Maximum number of rotated backups kept per file
pub const MAX_BAK_FILES: u32 = 3;

fn bak_path(path: &Path, n: u32) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    if n == 1 {
        name.push(".bak");
    } else {
        name.push(format!(".bak.{n}"));
    }
    PathBuf::from(name)
}

/// Make room for a new backup of `path` and return where it should go.
///
/// Keeps up to [`MAX_BAK_FILES`] backups: `<path>.bak`, `<path>.bak.2`,
/// `<path>.bak.3`. The oldest is removed and the rest shift up by one.
/// A failed removal or shift stops the rotation, so `<path>.bak` is only
/// returned once it is free.
pub fn rotate_bak_path(path: &Path) -> io::Result<PathBuf> {
    let oldest = bak_path(path, MAX_BAK_FILES);
    if oldest.exists() {
        fs::remove_file(&oldest).inspect_err(|e| {
            tracing::warn!(path = %oldest.display(), error = %e, "failed to remove oldest backup");
        })?;
    }

    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak_path(path, n);
        if src.exists() {
            let dst = bak_path(path, n + 1);
            fs::rename(&src, &dst).inspect_err(|e| {
                tracing::warn!(
                    from = %src.display(),
                    to = %dst.display(),
                    error = %e,
                    "failed to shift backup"
                );
            })?;
        }
    }

    Ok(bak_path(path, 1))
}

#[cfg(test)]
#[path = "backup_tests.rs"]
mod tests;
