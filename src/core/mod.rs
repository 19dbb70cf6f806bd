// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout readoutcodec.
//!
//! - [`ReadoutError`] - Error taxonomy for cursor, decode and tail failures
//! - [`Result`] - Crate result alias

pub mod error;

pub use error::{ReadoutError, Result};
