// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.

#![allow(dead_code)]

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use readoutcodec::encoding::record::{
    RECORD_SIZE, TAG_DATA, TAG_READOUT_HEADER_L0, TAG_READOUT_HEADER_L1, TAG_TRIGGER,
};

// ============================================================================
// Record Builders
// ============================================================================

/// A zeroed record carrying `tag` in its low byte and `marker` in its last byte.
pub fn record(tag: u8, marker: u8) -> [u8; RECORD_SIZE] {
    let mut bytes = [0u8; RECORD_SIZE];
    bytes[0] = tag;
    bytes[RECORD_SIZE - 1] = marker;
    bytes
}

/// A data record with the given bunch-crossing and orbit counters.
pub fn data_record(bx_cnt: u16, ob_cnt: u32) -> [u8; RECORD_SIZE] {
    let mut bytes = [0u8; RECORD_SIZE];
    bytes[0] = TAG_DATA;
    bytes[2..4].copy_from_slice(&(bx_cnt & 0x0FFF).to_le_bytes());
    bytes[4..8].copy_from_slice(&ob_cnt.to_le_bytes());
    bytes
}

/// One L0 header, one L1 header, one trigger, one undefined record, then
/// `data` data records with `bx_cnt == i`.
pub fn mixed_stream(data: usize) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&record(TAG_READOUT_HEADER_L0, 0));
    out.extend_from_slice(&record(TAG_READOUT_HEADER_L1, 1));
    out.extend_from_slice(&record(TAG_TRIGGER, 2));
    out.extend_from_slice(&record(0x55, 3));
    for i in 0..data {
        out.extend_from_slice(&data_record(i as u16, i as u32 * 3));
    }
    out
}

// ============================================================================
// Temp Files
// ============================================================================

/// Unique path in the temp directory for this test process.
pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "readoutcodec_it_{}_{}",
        std::process::id(),
        name
    ))
}

/// Append `bytes` to `path`, creating it if needed.
pub fn append(path: &Path, bytes: &[u8]) {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
}

/// Removes the file when dropped.
pub struct TempGuard(pub PathBuf);

impl TempGuard {
    /// Guard a fresh path, removing any leftover from an earlier run.
    pub fn new(name: &str) -> Self {
        let path = temp_path(name);
        let _ = fs::remove_file(&path);
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}
