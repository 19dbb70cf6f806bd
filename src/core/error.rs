// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for readoutcodec.
//!
//! Covers the three places the pipeline can fail:
//! - Cursor reads past the end (or before the start) of a buffer
//! - Opening and reopening the tailed file
//! - Loading configuration

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the decoding pipeline and the tail reader.
#[derive(Debug, Error)]
pub enum ReadoutError {
    /// A cursor read, skip or align needed more bytes than remain.
    #[error("Out of range: needed {needed} bytes at offset {offset}, but only {available} available")]
    OutOfRange {
        /// Cursor position when the read was attempted
        offset: usize,
        /// Bytes requested
        needed: usize,
        /// Bytes remaining after `offset`
        available: usize,
    },

    /// A rewind would move the cursor before the start of the buffer.
    #[error("Rewind before start: cannot rewind {requested} bytes from offset {offset}")]
    RewindBeforeStart {
        /// Cursor position when the rewind was attempted
        offset: usize,
        /// Bytes requested
        requested: usize,
    },

    /// A single-record decode was handed a window shorter than a record.
    #[error("Record too short: expected at least {expected} bytes, got {actual}")]
    RecordTooShort {
        /// Minimum window length
        expected: usize,
        /// Window length supplied
        actual: usize,
    },

    /// The tailed path could not be opened.
    #[error("Failed to open '{}': {source}", .path.display())]
    OpenFailure {
        /// Path that failed to open
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The tailed path could not be reopened after rotation or truncation.
    #[error("Failed to reopen '{}': {source}", .path.display())]
    ReopenFailure {
        /// Path that failed to reopen
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A configuration value is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration file could not be parsed.
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// Other I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReadoutError {
    /// Create an out-of-range error.
    pub fn out_of_range(offset: usize, needed: usize, available: usize) -> Self {
        ReadoutError::OutOfRange {
            offset,
            needed,
            available,
        }
    }

    /// Create a rewind-before-start error.
    pub fn rewind_before_start(offset: usize, requested: usize) -> Self {
        ReadoutError::RewindBeforeStart { offset, requested }
    }

    /// Create a record-too-short error.
    pub fn record_too_short(expected: usize, actual: usize) -> Self {
        ReadoutError::RecordTooShort { expected, actual }
    }

    /// Create an open failure for `path`.
    pub fn open_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReadoutError::OpenFailure {
            path: path.into(),
            source,
        }
    }

    /// Create a reopen failure for `path`.
    pub fn reopen_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReadoutError::ReopenFailure {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        ReadoutError::InvalidConfig(message.into())
    }

    /// Whether the fallible cursor API could have recovered from this error.
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            ReadoutError::OutOfRange { .. } | ReadoutError::RewindBeforeStart { .. }
        )
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            ReadoutError::OutOfRange {
                offset,
                needed,
                available,
            } => vec![
                ("offset", offset.to_string()),
                ("needed", needed.to_string()),
                ("available", available.to_string()),
            ],
            ReadoutError::RewindBeforeStart { offset, requested } => vec![
                ("offset", offset.to_string()),
                ("requested", requested.to_string()),
            ],
            ReadoutError::RecordTooShort { expected, actual } => vec![
                ("expected", expected.to_string()),
                ("actual", actual.to_string()),
            ],
            ReadoutError::OpenFailure { path, source }
            | ReadoutError::ReopenFailure { path, source } => vec![
                ("path", path.display().to_string()),
                ("cause", source.to_string()),
            ],
            ReadoutError::InvalidConfig(msg) => vec![("message", msg.clone())],
            ReadoutError::Config(e) => vec![("message", e.to_string())],
            ReadoutError::Io(e) => vec![("message", e.to_string())],
        }
    }
}

/// Result type for readoutcodec operations.
pub type Result<T> = std::result::Result<T, ReadoutError>;
