// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Stable identity of an on-disk file.
//!
//! Used by the tail reader to notice that the path now names a different
//! file (log rotation, or a writer replacing the file).

use std::fs::Metadata;
use std::io;
use std::path::Path;

/// Identity token compared with `==`.
///
/// Unix: device and inode number. Elsewhere: the file's creation time,
/// which changes when a file is replaced and is stable while it grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    #[cfg(unix)]
    dev: u64,
    #[cfg(unix)]
    ino: u64,
    #[cfg(not(unix))]
    created: Option<std::time::SystemTime>,
}

impl FileIdentity {
    #[cfg(unix)]
    pub fn from_metadata(meta: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;

        Self {
            dev: meta.dev(),
            ino: meta.ino(),
        }
    }

    #[cfg(not(unix))]
    pub fn from_metadata(meta: &Metadata) -> Self {
        Self {
            created: meta.created().ok(),
        }
    }

    /// Stat `path` (following symlinks) and return its identity.
    pub fn of_path(path: impl AsRef<Path>) -> io::Result<Self> {
        std::fs::metadata(path).map(|meta| Self::from_metadata(&meta))
    }
}
