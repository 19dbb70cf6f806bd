// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! I/O layer: stream parsing, chunk reassembly and file tailing.
//!
//! Data flows one way:
//!
//! ```text
//! TailSession (reads growing file)
//!   ↓ raw chunks
//! ChunkReassembler (restores record alignment)
//!   ↓ whole-record spans
//! StreamParser (classifies, decodes, dispatches to callbacks)
//! ```
//!
//! [`RecordStream`] bundles the last two stages and plugs into a
//! [`TailSession`] as its [`TailSink`].

pub mod identity;
pub mod parser;
pub mod reassembler;
pub mod scan;
pub mod tail;

pub use identity::FileIdentity;
pub use parser::{Heartbeat, Packet, ParserStats, RecordCounts, RecordHandlers, StreamParser};
pub use reassembler::{ChunkReassembler, RecordStream};
pub use scan::{count_types, parse_record, scan_first_n, MappedLog};
pub use tail::{
    StartPosition, TailEvent, TailOptions, TailSession, TailSink, TailState, TailStats,
    DEFAULT_POLL_INTERVAL, DEFAULT_READ_CHUNK_SIZE,
};
