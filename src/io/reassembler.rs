// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Glue arbitrarily-sized chunks into whole records.
//!
//! Reads from a growing file end wherever the writer happened to be, so a
//! record can be split across two reads. [`ChunkReassembler`] holds the
//! incomplete tail of one chunk until the next one completes it, and only
//! ever emits record-aligned spans.

use tracing::warn;

use super::parser::StreamParser;
use super::tail::TailSink;
use crate::encoding::record::RECORD_SIZE;
use crate::{ReadoutError, Result};

/// Carry-over buffer for a partial trailing record.
///
/// Invariant: `carry_len() < record_size()`. No byte handed to
/// [`push`](Self::push) is ever dropped.
#[derive(Debug, Clone)]
pub struct ChunkReassembler {
    record_size: usize,
    carry: Vec<u8>,
}

impl Default for ChunkReassembler {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkReassembler {
    /// Create a reassembler for [`RECORD_SIZE`] records.
    pub fn new() -> Self {
        Self {
            record_size: RECORD_SIZE,
            carry: Vec::with_capacity(RECORD_SIZE),
        }
    }

    pub fn with_record_size(record_size: usize) -> Result<Self> {
        if record_size == 0 {
            return Err(ReadoutError::invalid_config("record size must be non-zero"));
        }
        Ok(Self {
            record_size,
            carry: Vec::with_capacity(record_size),
        })
    }

    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Bytes currently held back waiting for the rest of their record.
    pub fn carry_len(&self) -> usize {
        self.carry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carry.is_empty()
    }

    /// Drop the carry-over. Returns how many bytes were discarded.
    pub fn reset(&mut self) -> usize {
        let discarded = self.carry.len();
        self.carry.clear();
        discarded
    }

    /// Feed one raw chunk, calling `emit` with record-aligned spans.
    ///
    /// A record completed from carry-over is emitted on its own, followed by
    /// at most one span holding every whole record left in `chunk`. Returns
    /// the number of records emitted.
    pub fn push(&mut self, mut chunk: &[u8], mut emit: impl FnMut(&[u8])) -> usize {
        let mut emitted = 0;

        if !self.carry.is_empty() {
            let need = self.record_size - self.carry.len();
            if chunk.len() < need {
                self.carry.extend_from_slice(chunk);
                return 0;
            }
            self.carry.extend_from_slice(&chunk[..need]);
            emit(&self.carry);
            self.carry.clear();
            emitted += 1;
            chunk = &chunk[need..];
        }

        let remainder = chunk.len() % self.record_size;
        let (aligned, tail) = chunk.split_at(chunk.len() - remainder);
        if !aligned.is_empty() {
            emit(aligned);
            emitted += aligned.len() / self.record_size;
        }
        self.carry.extend_from_slice(tail);

        emitted
    }
}

/// A reassembler feeding a parser: raw bytes in, callbacks out.
#[derive(Debug)]
pub struct RecordStream<'a> {
    reassembler: ChunkReassembler,
    parser: StreamParser<'a>,
}

impl<'a> RecordStream<'a> {
    pub fn new(parser: StreamParser<'a>) -> Self {
        let reassembler = ChunkReassembler {
            record_size: parser.record_size(),
            carry: Vec::with_capacity(parser.record_size()),
        };
        Self {
            reassembler,
            parser,
        }
    }

    /// Feed one raw chunk. Returns the number of records parsed.
    pub fn push(&mut self, chunk: &[u8]) -> usize {
        let parser = &mut self.parser;
        self.reassembler.push(chunk, |span| {
            parser.feed(span);
        })
    }

    pub fn carry_len(&self) -> usize {
        self.reassembler.carry_len()
    }

    /// Drop any partial record. Returns how many bytes were discarded.
    pub fn reset(&mut self) -> usize {
        self.reassembler.reset()
    }

    pub fn parser(&self) -> &StreamParser<'a> {
        &self.parser
    }

    pub fn into_parser(self) -> StreamParser<'a> {
        self.parser
    }
}

impl TailSink for RecordStream<'_> {
    fn on_bytes(&mut self, bytes: &[u8]) {
        self.push(bytes);
    }

    fn on_rotate(&mut self) {
        let discarded = self.reset();
        if discarded > 0 {
            warn!(
                discarded,
                "Dropping partial record left over from the previous file"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::parser::RecordHandlers;

    fn collect(reassembler: &mut ChunkReassembler, chunk: &[u8]) -> Vec<Vec<u8>> {
        let mut spans = Vec::new();
        reassembler.push(chunk, |span| spans.push(span.to_vec()));
        spans
    }

    #[test]
    fn test_aligned_chunk_passes_through() {
        let mut reassembler = ChunkReassembler::new();
        let chunk = vec![7u8; RECORD_SIZE * 3];
        let spans = collect(&mut reassembler, &chunk);
        assert_eq!(spans, vec![chunk]);
        assert!(reassembler.is_empty());
    }

    #[test]
    fn test_split_record_completes_on_second_push() {
        let mut reassembler = ChunkReassembler::new();
        let bytes: Vec<u8> = (0..64u8).collect();

        let mut spans = Vec::new();
        assert_eq!(reassembler.push(&bytes[..17], |s| spans.push(s.to_vec())), 0);
        assert!(spans.is_empty());
        assert_eq!(reassembler.carry_len(), 17);

        assert_eq!(reassembler.push(&bytes[17..32], |s| spans.push(s.to_vec())), 1);
        assert_eq!(spans, vec![bytes[..32].to_vec()]);
        assert_eq!(reassembler.carry_len(), 0);

        assert_eq!(reassembler.push(&bytes[32..], |s| spans.push(s.to_vec())), 1);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1], bytes[32..].to_vec());
        assert!(reassembler.is_empty());
    }

    #[test]
    fn test_short_chunks_accumulate() {
        let mut reassembler = ChunkReassembler::new();
        for _ in 0..RECORD_SIZE - 1 {
            assert!(collect(&mut reassembler, &[1]).is_empty());
        }
        assert_eq!(reassembler.carry_len(), RECORD_SIZE - 1);
        let spans = collect(&mut reassembler, &[1, 2, 3]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].len(), RECORD_SIZE);
        assert_eq!(reassembler.carry_len(), 2);
    }

    #[test]
    fn test_carry_then_aligned_then_tail() {
        let mut reassembler = ChunkReassembler::new();
        let bytes: Vec<u8> = (0..=255u8).cycle().take(RECORD_SIZE * 4).collect();

        collect(&mut reassembler, &bytes[..10]);
        let spans = collect(&mut reassembler, &bytes[10..10 + RECORD_SIZE * 3 + 5]);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0], bytes[..RECORD_SIZE].to_vec());
        assert_eq!(spans[1], bytes[RECORD_SIZE..RECORD_SIZE * 3].to_vec());
        assert_eq!(reassembler.carry_len(), 15);
    }

    #[test]
    fn test_empty_chunk_is_noop() {
        let mut reassembler = ChunkReassembler::new();
        collect(&mut reassembler, &[9; 5]);
        assert!(collect(&mut reassembler, &[]).is_empty());
        assert_eq!(reassembler.carry_len(), 5);
    }

    #[test]
    fn test_reset_discards_carry() {
        let mut reassembler = ChunkReassembler::with_record_size(8).unwrap();
        collect(&mut reassembler, &[1; 13]);
        assert_eq!(reassembler.carry_len(), 5);
        assert_eq!(reassembler.reset(), 5);
        assert!(reassembler.is_empty());
        assert!(ChunkReassembler::with_record_size(0).is_err());
    }

    #[test]
    fn test_record_stream_rotation_drops_stale_bytes() {
        let mut data = 0;
        {
            let parser = StreamParser::new(RecordHandlers::new().on_data(|_, _| data += 1));
            let mut stream = RecordStream::new(parser);

            let mut record = [0u8; RECORD_SIZE];
            record[0] = 0xAC;

            stream.on_bytes(&record[..20]);
            stream.on_rotate();
            assert_eq!(stream.carry_len(), 0);

            stream.on_bytes(&record);
            assert_eq!(stream.parser().stats().counts.data, 1);
        }
        assert_eq!(data, 1);
    }
}
