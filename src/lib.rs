// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Readoutcodec
//!
//! Decoder for fixed-size binary readout records from detector
//! front-end electronics.
//!
//! ## Architecture
//!
//! - `encoding/` - Byte cursor, record classification and per-kind decoders
//! - `io/` - Streaming parser, chunk reassembly, file tailing and scanning
//! - `config` - TOML configuration for the above
//!
//! ## Example: Tailing a growing log
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use readoutcodec::io::{RecordHandlers, RecordStream, StreamParser, TailOptions, TailSession};
//!
//! let mut data_records = 0u64;
//! let handlers = RecordHandlers::new().on_data(|record, _raw| {
//!     data_records += 1;
//!     println!("bx_cnt={} ob_cnt={}", record.bx_cnt, record.ob_cnt);
//! });
//! let mut stream = RecordStream::new(StreamParser::new(handlers));
//!
//! let mut session = TailSession::open("readout.bin", TailOptions::default())?;
//! let stats = session.run(&mut stream, || false);
//! println!("{} bytes read", stats.bytes_delivered);
//! # Ok(())
//! # }
//! ```
//!
//! ## Example: Decoding a buffer
//!
//! ```rust
//! use readoutcodec::encoding::{decode_record, DataLayout, DecodedRecord, RECORD_SIZE};
//!
//! let mut window = [0u8; RECORD_SIZE];
//! window[0] = 0xAC;
//! match decode_record(&window, DataLayout::default()) {
//!     DecodedRecord::Data(data) => assert_eq!(data.header_type, 0xAC),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

// Core types
pub mod core;

pub use core::{ReadoutError, Result};

// Record layout and decoding
pub mod encoding;

// Parsing, reassembly and tailing
pub mod io;

// TOML configuration
pub mod config;

pub use config::{Config, DecodeConfig, TailConfig};
pub use encoding::{
    classify, decode_record, ByteCursor, DataLayout, DecodedRecord, RecordKind, RECORD_SIZE,
};
pub use io::{
    ChunkReassembler, RecordHandlers, RecordStream, StreamParser, TailOptions, TailSession,
    TailSink,
};
