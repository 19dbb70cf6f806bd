// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Record-level decoding.
//!
//! - [`cursor`] - Bounds-checked byte cursor with explicit byte order
//! - [`record`] - Record size, kinds and tag classification
//! - [`layout`] - Byte offsets and bit-field positions per record kind
//! - [`decoder`] - Field decoders producing typed record structs

pub mod cursor;
pub mod decoder;
pub mod layout;
pub mod record;

pub use cursor::ByteCursor;
pub use decoder::{
    decode_data, decode_readout_header_l0, decode_readout_header_l1, decode_record,
    decode_trigger, DataRecord, DecodedRecord, ReadoutHeaderL0, ReadoutHeaderL1, TriggerRecord,
};
pub use layout::DataLayout;
pub use record::{classify, RecordKind, RECORD_SIZE};
