// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Field decoders, one per record kind.
//!
//! Decoders are pure and never fail. A window shorter than a record decodes
//! best-effort: fields that fall outside it are zero. Deciding whether a
//! record was misclassified is left to the caller.

use serde::Serialize;

use super::layout::{self, le16_at, le32_at, le64_at, le8_at, DataLayout};
use super::record::{classify, RecordKind};

/// Readout data header, first word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReadoutHeaderL0 {
    pub header_version: u8,
    pub header_size: u8,
    pub fee_id: u16,
    pub priority_bit: u8,
    pub system_id: u8,
    pub reserved0: u16,
    pub offset_new_packet: u16,
    pub memory_size: u16,
    pub link_id: u8,
    pub packet_counter: u8,
    /// 12 bits
    pub cru_id: u16,
    /// 4 bits
    pub dw: u8,
    /// 12 bits
    pub bc: u16,
    /// 20 bits
    pub reserved1: u32,
    pub orbit: u32,
    pub data_format: u8,
    /// 24 bits
    pub reserved2: u32,
    pub reserved3: u32,
}

/// Readout data header, second word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReadoutHeaderL1 {
    pub trg_type: u32,
    pub hb_packet_counter: u16,
    pub stop_bit: u8,
    pub reserved0: u8,
    pub reserved1: u32,
    pub reserved2: u32,
    pub detector_field: u32,
    pub par_bit: u16,
    pub reserved3: u16,
    pub reserved4: u32,
    pub reserved5: u32,
}

/// Detector payload record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DataRecord {
    /// 0xAC for well-formed records
    pub header_type: u8,
    pub header_vldb_id: u8,
    /// 12 bits
    pub bx_cnt: u16,
    /// 32 bits under [`DataLayout::Orbit32`], 16 bits under [`DataLayout::Orbit16`]
    pub ob_cnt: u32,
    /// Always zero under [`DataLayout::Orbit32`]
    pub reserved0: u16,
    pub data_words: [u32; 6],
}

/// Global trigger timing record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TriggerRecord {
    pub header_type: u32,
    pub bx_cnt: u64,
    pub ob_cnt: u64,
    pub reserved0: u32,
    pub reserved1: u64,
}

/// A classified and decoded record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "fields")]
pub enum DecodedRecord {
    Data(DataRecord),
    Trigger(TriggerRecord),
    ReadoutHeaderL0(ReadoutHeaderL0),
    ReadoutHeaderL1(ReadoutHeaderL1),
    Undefined,
}

impl DecodedRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            DecodedRecord::Data(_) => RecordKind::Data,
            DecodedRecord::Trigger(_) => RecordKind::Trigger,
            DecodedRecord::ReadoutHeaderL0(_) => RecordKind::ReadoutHeaderL0,
            DecodedRecord::ReadoutHeaderL1(_) => RecordKind::ReadoutHeaderL1,
            DecodedRecord::Undefined => RecordKind::Undefined,
        }
    }
}

pub fn decode_readout_header_l0(window: &[u8]) -> ReadoutHeaderL0 {
    use layout::l0::*;

    ReadoutHeaderL0 {
        header_version: le8_at(window, HEADER_VERSION),
        header_size: le8_at(window, HEADER_SIZE),
        fee_id: le16_at(window, FEE_ID),
        priority_bit: le8_at(window, PRIORITY_BIT),
        system_id: le8_at(window, SYSTEM_ID),
        reserved0: le16_at(window, RESERVED0),
        offset_new_packet: le16_at(window, OFFSET_NEW_PACKET),
        memory_size: le16_at(window, MEMORY_SIZE),
        link_id: le8_at(window, LINK_ID),
        packet_counter: le8_at(window, PACKET_COUNTER),
        cru_id: CRU_ID_BITS.extract(le16_at(window, CRU_ID).into()) as u16,
        dw: DW_BITS.extract(le8_at(window, DW).into()) as u8,
        bc: BC_BITS.extract(le16_at(window, BC).into()) as u16,
        reserved1: RESERVED1_BITS.extract(le32_at(window, RESERVED1).into()) as u32,
        orbit: le32_at(window, ORBIT),
        data_format: le8_at(window, DATA_FORMAT),
        reserved2: RESERVED2_BITS.extract(le32_at(window, RESERVED2).into()) as u32,
        reserved3: le32_at(window, RESERVED3),
    }
}

pub fn decode_readout_header_l1(window: &[u8]) -> ReadoutHeaderL1 {
    use layout::l1::*;

    ReadoutHeaderL1 {
        trg_type: le32_at(window, TRG_TYPE),
        hb_packet_counter: le16_at(window, HB_PACKET_COUNTER),
        stop_bit: le8_at(window, STOP_BIT),
        reserved0: le8_at(window, RESERVED0),
        reserved1: le32_at(window, RESERVED1),
        reserved2: le32_at(window, RESERVED2),
        detector_field: le32_at(window, DETECTOR_FIELD),
        par_bit: le16_at(window, PAR_BIT),
        reserved3: le16_at(window, RESERVED3),
        reserved4: le32_at(window, RESERVED4),
        reserved5: le32_at(window, RESERVED5),
    }
}

pub fn decode_data(window: &[u8], layout: DataLayout) -> DataRecord {
    use layout::data::*;

    let (ob_cnt, reserved0) = match layout {
        DataLayout::Orbit32 => (le32_at(window, OB_CNT), 0),
        DataLayout::Orbit16 => (
            u32::from(le16_at(window, OB_CNT)),
            le16_at(window, RESERVED0),
        ),
    };

    DataRecord {
        header_type: le8_at(window, HEADER_TYPE),
        header_vldb_id: le8_at(window, HEADER_VLDB_ID),
        bx_cnt: BX_CNT_BITS.extract(le16_at(window, BX_CNT).into()) as u16,
        ob_cnt,
        reserved0,
        data_words: DATA_WORDS.map(|offset| le32_at(window, offset)),
    }
}

pub fn decode_trigger(window: &[u8]) -> TriggerRecord {
    use layout::trigger::*;

    TriggerRecord {
        header_type: le32_at(window, HEADER_TYPE),
        bx_cnt: le64_at(window, BX_CNT),
        ob_cnt: le64_at(window, OB_CNT),
        reserved0: le32_at(window, RESERVED0),
        reserved1: le64_at(window, RESERVED1),
    }
}

/// Classify `window` and decode it with the matching decoder.
pub fn decode_record(window: &[u8], layout: DataLayout) -> DecodedRecord {
    match classify(window) {
        RecordKind::Data => DecodedRecord::Data(decode_data(window, layout)),
        RecordKind::Trigger => DecodedRecord::Trigger(decode_trigger(window)),
        RecordKind::ReadoutHeaderL0 => {
            DecodedRecord::ReadoutHeaderL0(decode_readout_header_l0(window))
        }
        RecordKind::ReadoutHeaderL1 => {
            DecodedRecord::ReadoutHeaderL1(decode_readout_header_l1(window))
        }
        RecordKind::Undefined => DecodedRecord::Undefined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::layout::BitField;
    use crate::encoding::record::RECORD_SIZE;

    fn put_u16(window: &mut [u8], offset: usize, value: u16) {
        window[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }

    fn put_u32(window: &mut [u8], offset: usize, value: u32) {
        window[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    fn put_u64(window: &mut [u8], offset: usize, value: u64) {
        window[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
    }

    /// Write `value` into `field` of the `len`-byte LE integer at `offset`,
    /// keeping neighbouring bits.
    fn put_bits(window: &mut [u8], offset: usize, len: usize, field: BitField, value: u64) {
        let mut raw = [0u8; 8];
        raw[..len].copy_from_slice(&window[offset..offset + len]);
        let updated = field.insert(u64::from_le_bytes(raw), value).to_le_bytes();
        window[offset..offset + len].copy_from_slice(&updated[..len]);
    }

    fn sample_window(first: u8) -> [u8; RECORD_SIZE] {
        let mut window = [0u8; RECORD_SIZE];
        for (i, b) in window.iter_mut().enumerate() {
            *b = (i as u8).wrapping_mul(17).wrapping_add(1);
        }
        window[0] = first;
        window
    }

    #[test]
    fn test_data_record_header_type() {
        let mut window = [0u8; RECORD_SIZE];
        window[0] = 0xAC;
        window[1] = 0x00;
        match decode_record(&window, DataLayout::Orbit32) {
            DecodedRecord::Data(record) => assert_eq!(record.header_type, 0xAC),
            other => panic!("expected data record, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_data_orbit32() {
        let mut window = [0u8; RECORD_SIZE];
        window[0] = 0xAC;
        window[1] = 0x5A;
        put_u16(&mut window, 2, 0xFABC);
        put_u32(&mut window, 4, 0xDEAD_BEEF);
        for (i, offset) in layout::data::DATA_WORDS.iter().enumerate() {
            put_u32(&mut window, *offset, 0x1000_0000 + i as u32);
        }

        let record = decode_data(&window, DataLayout::Orbit32);
        assert_eq!(record.header_vldb_id, 0x5A);
        assert_eq!(record.bx_cnt, 0x0ABC);
        assert_eq!(record.ob_cnt, 0xDEAD_BEEF);
        assert_eq!(record.reserved0, 0);
        assert_eq!(
            record.data_words,
            [
                0x1000_0000,
                0x1000_0001,
                0x1000_0002,
                0x1000_0003,
                0x1000_0004,
                0x1000_0005
            ]
        );
    }

    #[test]
    fn test_decode_data_orbit16() {
        let mut window = [0u8; RECORD_SIZE];
        window[0] = 0xAC;
        put_u32(&mut window, 4, 0xDEAD_BEEF);

        let record = decode_data(&window, DataLayout::Orbit16);
        assert_eq!(record.ob_cnt, 0xBEEF);
        assert_eq!(record.reserved0, 0xDEAD);
    }

    #[test]
    fn test_decode_trigger() {
        let mut window = [0u8; RECORD_SIZE];
        put_u32(&mut window, 0, 0x0000_BBBB);
        put_u64(&mut window, 4, 0x0102_0304_0506_0708);
        put_u64(&mut window, 12, 0x1112_1314_1516_1718);
        put_u32(&mut window, 20, 0xCAFE_F00D);
        put_u64(&mut window, 24, u64::MAX - 1);

        let record = decode_trigger(&window);
        assert_eq!(record.header_type, 0xBBBB);
        assert_eq!(record.bx_cnt, 0x0102_0304_0506_0708);
        assert_eq!(record.ob_cnt, 0x1112_1314_1516_1718);
        assert_eq!(record.reserved0, 0xCAFE_F00D);
        assert_eq!(record.reserved1, u64::MAX - 1);
    }

    #[test]
    fn test_decode_readout_header_l1() {
        let mut window = [0u8; RECORD_SIZE];
        put_u32(&mut window, 0, 0x0000_6A03);
        put_u16(&mut window, 4, 0x0102);
        window[6] = 1;
        window[7] = 0x7F;
        put_u32(&mut window, 16, 0x0000_0ACE);
        put_u16(&mut window, 20, 0x8001);
        put_u32(&mut window, 28, 0xFFFF_FFFF);

        let record = decode_readout_header_l1(&window);
        assert_eq!(record.trg_type, 0x6A03);
        assert_eq!(record.hb_packet_counter, 0x0102);
        assert_eq!(record.stop_bit, 1);
        assert_eq!(record.reserved0, 0x7F);
        assert_eq!(record.detector_field, 0x0ACE);
        assert_eq!(record.par_bit, 0x8001);
        assert_eq!(record.reserved5, 0xFFFF_FFFF);
    }

    #[test]
    fn test_decode_readout_header_l0_plain_fields() {
        let mut window = [0u8; RECORD_SIZE];
        window[0] = 0x07;
        window[1] = 0x40;
        put_u16(&mut window, 2, 0x1234);
        window[4] = 1;
        window[5] = 0x20;
        put_u16(&mut window, 8, 0x2000);
        put_u16(&mut window, 10, 0x1F80);
        window[12] = 11;
        window[13] = 0xFE;
        put_u32(&mut window, 20, 0x0055_AA55);
        window[24] = 2;
        put_u32(&mut window, 28, 0x8765_4321);

        let record = decode_readout_header_l0(&window);
        assert_eq!(record.header_version, 0x07);
        assert_eq!(record.header_size, 0x40);
        assert_eq!(record.fee_id, 0x1234);
        assert_eq!(record.priority_bit, 1);
        assert_eq!(record.system_id, 0x20);
        assert_eq!(record.offset_new_packet, 0x2000);
        assert_eq!(record.memory_size, 0x1F80);
        assert_eq!(record.link_id, 11);
        assert_eq!(record.packet_counter, 0xFE);
        assert_eq!(record.orbit, 0x0055_AA55);
        assert_eq!(record.data_format, 2);
        assert_eq!(record.reserved3, 0x8765_4321);
    }

    #[test]
    fn test_l0_bitfields_use_documented_masks() {
        let window = [0xFFu8; RECORD_SIZE];
        let record = decode_readout_header_l0(&window);
        assert_eq!(record.cru_id, 0x0FFF);
        assert_eq!(record.dw, 0x0F);
        assert_eq!(record.bc, 0x0FFF);
        assert_eq!(record.reserved1, 0x000F_FFFF);
        assert_eq!(record.reserved2, 0x00FF_FFFF);
    }

    #[test]
    fn test_bitfield_round_trip_cru_id() {
        let field = layout::l0::CRU_ID_BITS;
        for value in 0..(1u64 << field.width) {
            let mut window = sample_window(0x07);
            put_bits(&mut window, layout::l0::CRU_ID, 2, field, value);
            assert_eq!(decode_readout_header_l0(&window).cru_id as u64, value);
        }
    }

    #[test]
    fn test_bitfield_round_trip_dw() {
        let field = layout::l0::DW_BITS;
        for value in 0..(1u64 << field.width) {
            let mut window = sample_window(0x07);
            put_bits(&mut window, layout::l0::DW, 1, field, value);
            assert_eq!(decode_readout_header_l0(&window).dw as u64, value);
        }
    }

    #[test]
    fn test_bitfield_round_trip_bc_and_bx_cnt() {
        for value in 0..(1u64 << 12) {
            let mut window = sample_window(0x07);
            put_bits(&mut window, layout::l0::BC, 2, layout::l0::BC_BITS, value);
            assert_eq!(decode_readout_header_l0(&window).bc as u64, value);

            let mut window = sample_window(0xAC);
            put_bits(
                &mut window,
                layout::data::BX_CNT,
                2,
                layout::data::BX_CNT_BITS,
                value,
            );
            assert_eq!(
                decode_data(&window, DataLayout::Orbit32).bx_cnt as u64,
                value
            );
        }
    }

    #[test]
    fn test_bitfield_round_trip_reserved1() {
        let field = layout::l0::RESERVED1_BITS;
        // Full 20-bit range, stepped to keep the test quick; edges included.
        let values = (0..(1u64 << field.width))
            .step_by(97)
            .chain([(1u64 << field.width) - 1, 1, 0x8_0000]);
        for value in values {
            let mut window = sample_window(0x07);
            put_bits(&mut window, layout::l0::RESERVED1, 4, field, value);
            assert_eq!(decode_readout_header_l0(&window).reserved1 as u64, value);
        }
    }

    #[test]
    fn test_bitfield_round_trip_reserved2() {
        let field = layout::l0::RESERVED2_BITS;
        let values = (0..(1u64 << field.width))
            .step_by(1021)
            .chain([(1u64 << field.width) - 1, 1]);
        for value in values {
            let mut window = sample_window(0x07);
            put_bits(&mut window, layout::l0::RESERVED2, 4, field, value);
            assert_eq!(decode_readout_header_l0(&window).reserved2 as u64, value);
        }
    }

    #[test]
    fn test_short_window_zero_fills() {
        let window = [0xAC, 0x01, 0x34, 0x12, 0xFF];
        let record = decode_data(&window, DataLayout::Orbit32);
        assert_eq!(record.header_type, 0xAC);
        assert_eq!(record.header_vldb_id, 0x01);
        assert_eq!(record.bx_cnt, 0x0234);
        assert_eq!(record.ob_cnt, 0);
        assert_eq!(record.data_words, [0; 6]);

        assert_eq!(decode_trigger(&[]), TriggerRecord::default());
        assert_eq!(decode_readout_header_l1(&[0x03]).trg_type, 0);
    }

    #[test]
    fn test_decode_record_dispatch() {
        assert_eq!(
            decode_record(&sample_window(0xBB), DataLayout::Orbit32).kind(),
            RecordKind::Trigger
        );
        assert_eq!(
            decode_record(&sample_window(0x07), DataLayout::Orbit32).kind(),
            RecordKind::ReadoutHeaderL0
        );
        assert_eq!(
            decode_record(&sample_window(0x03), DataLayout::Orbit32).kind(),
            RecordKind::ReadoutHeaderL1
        );
        assert_eq!(
            decode_record(&sample_window(0x42), DataLayout::Orbit32),
            DecodedRecord::Undefined
        );
    }

    #[test]
    fn test_decoded_record_serializes_with_kind() {
        let json = serde_json::to_value(DecodedRecord::Undefined).unwrap();
        assert_eq!(json["kind"], "Undefined");

        let mut window = [0u8; RECORD_SIZE];
        window[0] = 0xAC;
        let json = serde_json::to_value(decode_record(&window, DataLayout::Orbit32)).unwrap();
        assert_eq!(json["kind"], "Data");
        assert_eq!(json["fields"]["header_type"], 0xAC);
    }
}
