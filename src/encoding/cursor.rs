// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Bounds-checked byte cursor with caller-selected byte order.
//!
//! Every consuming operation comes in two forms:
//! - a strict form returning [`Result`], failing with
//!   [`ReadoutError::OutOfRange`] so the caller can bail out with `?`
//! - a `try_*` form returning `Option`/`bool` for callers that want to
//!   test and recover
//!
//! Both forms leave the position untouched when they fail.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::{ReadoutError, Result};

/// Reference-only reader over a borrowed byte buffer.
///
/// Tracks a single `offset` with `0 <= offset <= size`. The buffer is never
/// copied; slices handed out borrow from the original data.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use readoutcodec::encoding::cursor::ByteCursor;
///
/// let data = [0xAC, 0x00, 0x2A, 0x00, 0x00, 0x00];
/// let mut cursor = ByteCursor::new(&data);
/// assert_eq!(cursor.read_u16_le()?, 0x00AC);
/// assert_eq!(cursor.read_u32_le()?, 42);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Total size of the underlying buffer.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Current read position.
    #[inline]
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Bytes left between the position and the end of the buffer.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Whether `n` more bytes can be consumed.
    #[inline]
    pub fn can_take(&self, n: usize) -> bool {
        n <= self.remaining()
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.offset == self.data.len()
    }

    /// The whole underlying buffer, independent of the position.
    pub fn as_slice(&self) -> &'a [u8] {
        self.data
    }

    fn out_of_range(&self, needed: usize) -> ReadoutError {
        ReadoutError::out_of_range(self.offset, needed, self.remaining())
    }

    /// Consume `n` bytes.
    pub fn take_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.try_take_bytes(n).ok_or_else(|| self.out_of_range(n))
    }

    /// Consume `n` bytes, or return `None` without moving.
    pub fn try_take_bytes(&mut self, n: usize) -> Option<&'a [u8]> {
        if !self.can_take(n) {
            return None;
        }
        let start = self.offset;
        self.offset += n;
        Some(&self.data[start..self.offset])
    }

    /// Look at the next `n` bytes without consuming them.
    pub fn peek(&self, n: usize) -> Result<&'a [u8]> {
        self.try_peek(n).ok_or_else(|| self.out_of_range(n))
    }

    pub fn try_peek(&self, n: usize) -> Option<&'a [u8]> {
        if !self.can_take(n) {
            return None;
        }
        Some(&self.data[self.offset..self.offset + n])
    }

    /// Skip `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take_bytes(n).map(|_| ())
    }

    pub fn try_skip(&mut self, n: usize) -> bool {
        self.try_take_bytes(n).is_some()
    }

    /// Advance to the next multiple of `n`, measured from the buffer start.
    ///
    /// No-op when already aligned or when `n == 0`.
    pub fn align(&mut self, n: usize) -> Result<()> {
        let padding = self.padding_for(n);
        self.skip(padding)
    }

    pub fn try_align(&mut self, n: usize) -> bool {
        let padding = self.padding_for(n);
        self.try_skip(padding)
    }

    fn padding_for(&self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        match self.offset % n {
            0 => 0,
            m => n - m,
        }
    }

    /// Move the position back by `n` bytes.
    pub fn rewind(&mut self, n: usize) -> Result<()> {
        if self.try_rewind(n) {
            Ok(())
        } else {
            Err(ReadoutError::rewind_before_start(self.offset, n))
        }
    }

    pub fn try_rewind(&mut self, n: usize) -> bool {
        if n > self.offset {
            return false;
        }
        self.offset -= n;
        true
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take_bytes(1)?[0])
    }

    pub fn try_read_u8(&mut self) -> Option<u8> {
        self.try_take_bytes(1).map(|b| b[0])
    }

    /// Read a u16 in byte order `B`.
    pub fn read_u16<B: ByteOrder>(&mut self) -> Result<u16> {
        self.take_bytes(2).map(B::read_u16)
    }

    pub fn try_read_u16<B: ByteOrder>(&mut self) -> Option<u16> {
        self.try_take_bytes(2).map(B::read_u16)
    }

    /// Read a u32 in byte order `B`.
    pub fn read_u32<B: ByteOrder>(&mut self) -> Result<u32> {
        self.take_bytes(4).map(B::read_u32)
    }

    pub fn try_read_u32<B: ByteOrder>(&mut self) -> Option<u32> {
        self.try_take_bytes(4).map(B::read_u32)
    }

    /// Read a u64 in byte order `B`.
    pub fn read_u64<B: ByteOrder>(&mut self) -> Result<u64> {
        self.take_bytes(8).map(B::read_u64)
    }

    pub fn try_read_u64<B: ByteOrder>(&mut self) -> Option<u64> {
        self.try_take_bytes(8).map(B::read_u64)
    }

    /// Read an IEEE-754 f32 in byte order `B`.
    pub fn read_f32<B: ByteOrder>(&mut self) -> Result<f32> {
        self.take_bytes(4).map(B::read_f32)
    }

    pub fn try_read_f32<B: ByteOrder>(&mut self) -> Option<f32> {
        self.try_take_bytes(4).map(B::read_f32)
    }

    /// Read an IEEE-754 f64 in byte order `B`.
    pub fn read_f64<B: ByteOrder>(&mut self) -> Result<f64> {
        self.take_bytes(8).map(B::read_f64)
    }

    pub fn try_read_f64<B: ByteOrder>(&mut self) -> Option<f64> {
        self.try_take_bytes(8).map(B::read_f64)
    }

    // Fixed-order shorthands.

    pub fn read_u16_le(&mut self) -> Result<u16> {
        self.read_u16::<LittleEndian>()
    }

    pub fn read_u16_be(&mut self) -> Result<u16> {
        self.read_u16::<BigEndian>()
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        self.read_u32::<LittleEndian>()
    }

    pub fn read_u32_be(&mut self) -> Result<u32> {
        self.read_u32::<BigEndian>()
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        self.read_u64::<LittleEndian>()
    }

    pub fn read_u64_be(&mut self) -> Result<u64> {
        self.read_u64::<BigEndian>()
    }

    pub fn read_f32_le(&mut self) -> Result<f32> {
        self.read_f32::<LittleEndian>()
    }

    pub fn read_f32_be(&mut self) -> Result<f32> {
        self.read_f32::<BigEndian>()
    }

    pub fn read_f64_le(&mut self) -> Result<f64> {
        self.read_f64::<LittleEndian>()
    }

    pub fn read_f64_be(&mut self) -> Result<f64> {
        self.read_f64::<BigEndian>()
    }
}
