// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Byte offsets and bit-field positions of every record kind.
//!
//! All multi-byte fields are little-endian. Offsets are bit-exact with the
//! readout producer and must not be changed.
//!
//! The `*_at` readers are permissive: a field that does not fit inside the
//! window reads as zero, so speculative decodes of short windows still yield
//! a struct.

use byteorder::LittleEndian;
use serde::{Deserialize, Serialize};

use super::cursor::ByteCursor;

/// Position of a sub-byte field inside its enclosing integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    /// Lowest bit of the field
    pub shift: u32,
    /// Number of bits
    pub width: u32,
}

impl BitField {
    pub const fn new(shift: u32, width: u32) -> Self {
        Self { shift, width }
    }

    /// Mask covering `width` bits, before shifting.
    pub const fn mask(&self) -> u64 {
        if self.width >= 64 {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        }
    }

    /// Extract the field from its enclosing integer.
    #[inline]
    pub const fn extract(&self, raw: u64) -> u64 {
        (raw >> self.shift) & self.mask()
    }

    /// Place `value` into the field's bits of `raw`, leaving other bits alone.
    #[inline]
    pub const fn insert(&self, raw: u64, value: u64) -> u64 {
        let mask = self.mask() << self.shift;
        (raw & !mask) | ((value << self.shift) & mask)
    }
}

/// Readout data header, first word.
pub mod l0 {
    use super::BitField;

    pub const HEADER_VERSION: usize = 0; // u8
    pub const HEADER_SIZE: usize = 1; // u8
    pub const FEE_ID: usize = 2; // u16
    pub const PRIORITY_BIT: usize = 4; // u8
    pub const SYSTEM_ID: usize = 5; // u8
    pub const RESERVED0: usize = 6; // u16
    pub const OFFSET_NEW_PACKET: usize = 8; // u16
    pub const MEMORY_SIZE: usize = 10; // u16
    pub const LINK_ID: usize = 12; // u8
    pub const PACKET_COUNTER: usize = 13; // u8
    pub const CRU_ID: usize = 14; // u16
    pub const DW: usize = 15; // u8
    pub const BC: usize = 16; // u16
    pub const RESERVED1: usize = 17; // u32, overlaps BC and ORBIT
    pub const ORBIT: usize = 20; // u32
    pub const DATA_FORMAT: usize = 24; // u8
    pub const RESERVED2: usize = 25; // u32, overlaps RESERVED3
    pub const RESERVED3: usize = 28; // u32

    pub const CRU_ID_BITS: BitField = BitField::new(0, 12);
    pub const DW_BITS: BitField = BitField::new(4, 4);
    pub const BC_BITS: BitField = BitField::new(0, 12);
    pub const RESERVED1_BITS: BitField = BitField::new(4, 20);
    pub const RESERVED2_BITS: BitField = BitField::new(0, 24);
}

/// Readout data header, second word.
pub mod l1 {
    pub const TRG_TYPE: usize = 0; // u32
    pub const HB_PACKET_COUNTER: usize = 4; // u16
    pub const STOP_BIT: usize = 6; // u8
    pub const RESERVED0: usize = 7; // u8
    pub const RESERVED1: usize = 8; // u32
    pub const RESERVED2: usize = 12; // u32
    pub const DETECTOR_FIELD: usize = 16; // u32
    pub const PAR_BIT: usize = 20; // u16
    pub const RESERVED3: usize = 22; // u16
    pub const RESERVED4: usize = 24; // u32
    pub const RESERVED5: usize = 28; // u32
}

/// Data record.
pub mod data {
    use super::BitField;

    pub const HEADER_TYPE: usize = 0; // u8
    pub const HEADER_VLDB_ID: usize = 1; // u8
    pub const BX_CNT: usize = 2; // u16
    pub const OB_CNT: usize = 4; // u32 (Orbit32) or u16 (Orbit16)
    pub const RESERVED0: usize = 6; // u16, Orbit16 only
    pub const DATA_WORDS: [usize; 6] = [8, 12, 16, 20, 24, 28]; // u32 each

    pub const BX_CNT_BITS: BitField = BitField::new(0, 12);
}

/// Trigger record.
pub mod trigger {
    pub const HEADER_TYPE: usize = 0; // u32
    pub const BX_CNT: usize = 4; // u64
    pub const OB_CNT: usize = 12; // u64
    pub const RESERVED0: usize = 20; // u32
    pub const RESERVED1: usize = 24; // u64
}

/// Width of the orbit counter in data records.
///
/// Two producer revisions disagree: one writes a 32-bit `ob_cnt` at offset 4,
/// the other a 16-bit `ob_cnt` followed by a 16-bit reserved word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataLayout {
    /// `ob_cnt` is a u32 at offset 4.
    #[default]
    Orbit32,
    /// `ob_cnt` is a u16 at offset 4, `reserved0` a u16 at offset 6.
    Orbit16,
}

impl std::str::FromStr for DataLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "orbit32" => Ok(DataLayout::Orbit32),
            "orbit16" => Ok(DataLayout::Orbit16),
            other => Err(format!(
                "unknown data layout '{other}', expected 'orbit32' or 'orbit16'"
            )),
        }
    }
}

fn read_at<T: Default>(
    window: &[u8],
    offset: usize,
    read: impl FnOnce(&mut ByteCursor<'_>) -> Option<T>,
) -> T {
    let mut cursor = ByteCursor::new(window);
    if !cursor.try_skip(offset) {
        return T::default();
    }
    read(&mut cursor).unwrap_or_default()
}

/// Byte at `offset`, zero if outside the window.
#[inline]
pub fn le8_at(window: &[u8], offset: usize) -> u8 {
    read_at(window, offset, |c| c.try_read_u8())
}

/// Little-endian u16 at `offset`, zero if it does not fit.
#[inline]
pub fn le16_at(window: &[u8], offset: usize) -> u16 {
    read_at(window, offset, |c| c.try_read_u16::<LittleEndian>())
}

/// Little-endian u32 at `offset`, zero if it does not fit.
#[inline]
pub fn le32_at(window: &[u8], offset: usize) -> u32 {
    read_at(window, offset, |c| c.try_read_u32::<LittleEndian>())
}

/// Little-endian u64 at `offset`, zero if it does not fit.
#[inline]
pub fn le64_at(window: &[u8], offset: usize) -> u64 {
    read_at(window, offset, |c| c.try_read_u64::<LittleEndian>())
}
