// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Whole-buffer scanning of finished logs.
//!
//! The tail reader handles files that are still being written. For a log
//! that is complete, map it with [`MappedLog`] and run the helpers here over
//! [`MappedLog::data`].
//!
//! ```rust,no_run
//! # fn main() -> readoutcodec::Result<()> {
//! use readoutcodec::encoding::RECORD_SIZE;
//! use readoutcodec::io::scan::{count_types, MappedLog};
//!
//! let log = MappedLog::open("readout.bin")?;
//! let counts = count_types(log.data(), RECORD_SIZE)?;
//! println!("{} records", counts.total());
//! # Ok(())
//! # }
//! ```

use std::fs::File;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::parser::RecordCounts;
use crate::encoding::decoder::{decode_record, DecodedRecord};
use crate::encoding::layout::DataLayout;
use crate::encoding::record::classify;
use crate::{ReadoutError, Result};

/// A read-only memory map of a finished log file.
pub struct MappedLog {
    mmap: memmap2::Mmap,
    path: PathBuf,
}

impl MappedLog {
    /// Open and map `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ReadoutError::OpenFailure`] if the file cannot be opened or
    /// mapped.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ReadoutError::open_failure(path, e))?;

        // The map is private to this value and only handed out as `&[u8]`
        // borrowed from it. Concurrent truncation by another process is not
        // guarded against.
        let mmap = unsafe { memmap2::Mmap::map(&file) }
            .map_err(|e| ReadoutError::open_failure(path, e))?;

        debug!(path = %path.display(), len = mmap.len(), "Mapped log");
        Ok(Self {
            mmap,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &[u8] {
        &self.mmap
    }

    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}

impl Deref for MappedLog {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.mmap
    }
}

impl std::fmt::Debug for MappedLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedLog")
            .field("path", &self.path)
            .field("len", &self.mmap.len())
            .finish()
    }
}

/// Classify every whole record in `buf` and count them per kind.
///
/// A trailing partial record is ignored.
///
/// # Errors
///
/// Returns [`ReadoutError::InvalidConfig`] if `record_size` is zero.
pub fn count_types(buf: &[u8], record_size: usize) -> Result<RecordCounts> {
    if record_size == 0 {
        return Err(ReadoutError::invalid_config("record size must be non-zero"));
    }

    let mut counts = RecordCounts::default();
    for window in buf.chunks_exact(record_size) {
        counts.record(classify(window));
    }
    Ok(counts)
}

/// Decode the first `n` records of `buf`, framed every `record_size` bytes.
///
/// Returns fewer than `n` entries when `buf` holds fewer whole records.
///
/// # Errors
///
/// Returns [`ReadoutError::InvalidConfig`] if `record_size` is zero.
pub fn scan_first_n(
    buf: &[u8],
    n: usize,
    record_size: usize,
    layout: DataLayout,
) -> Result<Vec<DecodedRecord>> {
    if record_size == 0 {
        return Err(ReadoutError::invalid_config("record size must be non-zero"));
    }

    Ok(buf
        .chunks_exact(record_size)
        .take(n)
        .map(|window| decode_record(window, layout))
        .collect())
}

/// Decode a single record, requiring a full `record_size` window.
///
/// Bytes past `record_size` are ignored.
///
/// # Errors
///
/// Returns [`ReadoutError::InvalidConfig`] if `record_size` is zero and
/// [`ReadoutError::RecordTooShort`] if `window` is shorter than
/// `record_size`.
pub fn parse_record(
    window: &[u8],
    record_size: usize,
    layout: DataLayout,
) -> Result<DecodedRecord> {
    if record_size == 0 {
        return Err(ReadoutError::invalid_config("record size must be non-zero"));
    }
    if window.len() < record_size {
        return Err(ReadoutError::record_too_short(record_size, window.len()));
    }
    Ok(decode_record(&window[..record_size], layout))
}
