// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Record framing and classification.
//!
//! A readout log is a flat sequence of fixed-size records. The kind of each
//! record is decided by the low byte of the little-endian u16 at offset 0.

use serde::Serialize;

use super::layout::le16_at;

/// Size in bytes of one record.
///
/// Some readout documentation quotes 40 bytes per record while the field
/// layouts and the producer's framing use 32. Override per parser with
/// [`StreamParser::with_record_size`](crate::io::parser::StreamParser::with_record_size)
/// or `decode.record_size` in the config file when a capture disagrees.
pub const RECORD_SIZE: usize = 32;

/// Tag byte of a data record.
pub const TAG_DATA: u8 = 0xAC;
/// Tag byte of a trigger record.
pub const TAG_TRIGGER: u8 = 0xBB;
/// Tag byte of a readout header, first word.
pub const TAG_READOUT_HEADER_L0: u8 = 0x07;
/// Tag byte of a readout header, second word.
pub const TAG_READOUT_HEADER_L1: u8 = 0x03;

/// Kind of a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordKind {
    /// Detector payload
    Data,
    /// Global trigger timing counters
    Trigger,
    /// Readout data header, first word
    ReadoutHeaderL0,
    /// Readout data header, second word
    ReadoutHeaderL1,
    /// Any other tag
    Undefined,
}

impl RecordKind {
    /// Every kind, in display order.
    pub const ALL: [RecordKind; 5] = [
        RecordKind::ReadoutHeaderL0,
        RecordKind::ReadoutHeaderL1,
        RecordKind::Trigger,
        RecordKind::Data,
        RecordKind::Undefined,
    ];

    /// Map a tag byte to its kind. Total: unknown tags are `Undefined`.
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            TAG_DATA => RecordKind::Data,
            TAG_TRIGGER => RecordKind::Trigger,
            TAG_READOUT_HEADER_L0 => RecordKind::ReadoutHeaderL0,
            TAG_READOUT_HEADER_L1 => RecordKind::ReadoutHeaderL1,
            _ => RecordKind::Undefined,
        }
    }

    /// The tag byte identifying this kind, `None` for `Undefined`.
    pub fn tag(&self) -> Option<u8> {
        match self {
            RecordKind::Data => Some(TAG_DATA),
            RecordKind::Trigger => Some(TAG_TRIGGER),
            RecordKind::ReadoutHeaderL0 => Some(TAG_READOUT_HEADER_L0),
            RecordKind::ReadoutHeaderL1 => Some(TAG_READOUT_HEADER_L1),
            RecordKind::Undefined => None,
        }
    }

    /// Short label used in summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Data => "DATA",
            RecordKind::Trigger => "TRG",
            RecordKind::ReadoutHeaderL0 => "L0",
            RecordKind::ReadoutHeaderL1 => "L1",
            RecordKind::Undefined => "UNDEFINED",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify one record window.
///
/// Lookahead only: nothing is consumed and nothing can fail. Windows shorter
/// than two bytes read as zero and come back `Undefined`.
#[inline]
pub fn classify(window: &[u8]) -> RecordKind {
    let tag = (le16_at(window, 0) & 0xFF) as u8;
    RecordKind::from_tag(tag)
}
