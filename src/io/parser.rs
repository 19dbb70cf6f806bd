// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Record-aligned stream parser with per-kind callbacks.
//!
//! [`StreamParser::feed`] walks a chunk record by record, classifies and
//! decodes each one, and hands the result to the callback registered for its
//! kind. The parser keeps no partial data: a chunk whose length is not a
//! multiple of the record size has its trailing bytes discarded. Use
//! [`ChunkReassembler`](super::reassembler::ChunkReassembler) to feed
//! arbitrarily-sized input.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::encoding::decoder::{
    decode_data, decode_readout_header_l0, decode_readout_header_l1, decode_trigger, DataRecord,
    ReadoutHeaderL0, ReadoutHeaderL1, TriggerRecord,
};
use crate::encoding::layout::DataLayout;
use crate::encoding::record::{classify, RecordKind, RECORD_SIZE};
use crate::{ReadoutError, Result};

/// A block of records that did not match any known kind.
///
/// Currently always exactly one record long.
#[derive(Debug, Clone, Copy)]
pub struct Packet<'b> {
    pub block: &'b [u8],
}

/// Two related lines forming a heartbeat.
///
/// Part of the registration surface only; classification never produces one.
#[derive(Debug, Clone, Copy)]
pub struct Heartbeat<'b> {
    pub lines: [&'b [u8]; 2],
}

type FieldsCallback<'a, T> = Box<dyn FnMut(&T, &[u8]) + 'a>;

/// Optional callback slots, one per record kind.
///
/// Callbacks may borrow caller state for `'a`, so counters and sinks can live
/// on the caller's stack. Unregistered kinds are decoded and dropped.
///
/// The `heartbeat` and `sync` slots are accepted for forward compatibility
/// but are never invoked.
#[derive(Default)]
pub struct RecordHandlers<'a> {
    data: Option<FieldsCallback<'a, DataRecord>>,
    trigger: Option<FieldsCallback<'a, TriggerRecord>>,
    readout_header_l0: Option<FieldsCallback<'a, ReadoutHeaderL0>>,
    readout_header_l1: Option<FieldsCallback<'a, ReadoutHeaderL1>>,
    unclassified: Option<Box<dyn FnMut(&Packet<'_>) + 'a>>,
    heartbeat: Option<Box<dyn FnMut(&Heartbeat<'_>) + 'a>>,
    sync: Option<Box<dyn FnMut(&[u8]) + 'a>>,
}

impl<'a> RecordHandlers<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_data(mut self, f: impl FnMut(&DataRecord, &[u8]) + 'a) -> Self {
        self.data = Some(Box::new(f));
        self
    }

    pub fn on_trigger(mut self, f: impl FnMut(&TriggerRecord, &[u8]) + 'a) -> Self {
        self.trigger = Some(Box::new(f));
        self
    }

    pub fn on_readout_header_l0(mut self, f: impl FnMut(&ReadoutHeaderL0, &[u8]) + 'a) -> Self {
        self.readout_header_l0 = Some(Box::new(f));
        self
    }

    pub fn on_readout_header_l1(mut self, f: impl FnMut(&ReadoutHeaderL1, &[u8]) + 'a) -> Self {
        self.readout_header_l1 = Some(Box::new(f));
        self
    }

    /// Called once per `Undefined` record.
    pub fn on_unclassified(mut self, f: impl FnMut(&Packet<'_>) + 'a) -> Self {
        self.unclassified = Some(Box::new(f));
        self
    }

    /// Accepted but never invoked.
    pub fn on_heartbeat(mut self, f: impl FnMut(&Heartbeat<'_>) + 'a) -> Self {
        self.heartbeat = Some(Box::new(f));
        self
    }

    /// Accepted but never invoked.
    pub fn on_sync(mut self, f: impl FnMut(&[u8]) + 'a) -> Self {
        self.sync = Some(Box::new(f));
        self
    }

    /// Whether a callback is registered for `kind`.
    pub fn handles(&self, kind: RecordKind) -> bool {
        match kind {
            RecordKind::Data => self.data.is_some(),
            RecordKind::Trigger => self.trigger.is_some(),
            RecordKind::ReadoutHeaderL0 => self.readout_header_l0.is_some(),
            RecordKind::ReadoutHeaderL1 => self.readout_header_l1.is_some(),
            RecordKind::Undefined => self.unclassified.is_some(),
        }
    }

    fn dispatch(&mut self, kind: RecordKind, window: &[u8], layout: DataLayout) {
        match kind {
            RecordKind::Data => {
                let record = decode_data(window, layout);
                if let Some(cb) = self.data.as_mut() {
                    cb(&record, window);
                }
            }
            RecordKind::Trigger => {
                let record = decode_trigger(window);
                if let Some(cb) = self.trigger.as_mut() {
                    cb(&record, window);
                }
            }
            RecordKind::ReadoutHeaderL0 => {
                let record = decode_readout_header_l0(window);
                if let Some(cb) = self.readout_header_l0.as_mut() {
                    cb(&record, window);
                }
            }
            RecordKind::ReadoutHeaderL1 => {
                let record = decode_readout_header_l1(window);
                if let Some(cb) = self.readout_header_l1.as_mut() {
                    cb(&record, window);
                }
            }
            RecordKind::Undefined => {
                if let Some(cb) = self.unclassified.as_mut() {
                    cb(&Packet { block: window });
                }
            }
        }
    }
}

impl fmt::Debug for RecordHandlers<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordHandlers")
            .field("data", &self.data.is_some())
            .field("trigger", &self.trigger.is_some())
            .field("readout_header_l0", &self.readout_header_l0.is_some())
            .field("readout_header_l1", &self.readout_header_l1.is_some())
            .field("unclassified", &self.unclassified.is_some())
            .field("heartbeat", &self.heartbeat.is_some())
            .field("sync", &self.sync.is_some())
            .finish()
    }
}

/// Per-kind record counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecordCounts {
    pub readout_header_l0: u64,
    pub readout_header_l1: u64,
    pub trigger: u64,
    pub data: u64,
    pub undefined: u64,
}

impl RecordCounts {
    /// Count one record of `kind`.
    pub fn record(&mut self, kind: RecordKind) {
        *self.slot(kind) += 1;
    }

    pub fn get(&self, kind: RecordKind) -> u64 {
        match kind {
            RecordKind::ReadoutHeaderL0 => self.readout_header_l0,
            RecordKind::ReadoutHeaderL1 => self.readout_header_l1,
            RecordKind::Trigger => self.trigger,
            RecordKind::Data => self.data,
            RecordKind::Undefined => self.undefined,
        }
    }

    /// Records of every kind.
    pub fn total(&self) -> u64 {
        self.readout_header_l0 + self.readout_header_l1 + self.trigger + self.data + self.undefined
    }

    fn slot(&mut self, kind: RecordKind) -> &mut u64 {
        match kind {
            RecordKind::ReadoutHeaderL0 => &mut self.readout_header_l0,
            RecordKind::ReadoutHeaderL1 => &mut self.readout_header_l1,
            RecordKind::Trigger => &mut self.trigger,
            RecordKind::Data => &mut self.data,
            RecordKind::Undefined => &mut self.undefined,
        }
    }
}

/// Counters accumulated by a [`StreamParser`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParserStats {
    /// Records classified, per kind
    pub counts: RecordCounts,
    /// Trailing bytes dropped from misaligned chunks
    pub discarded_bytes: u64,
}

/// Classifies and decodes whole records, dispatching to [`RecordHandlers`].
pub struct StreamParser<'a> {
    handlers: RecordHandlers<'a>,
    record_size: usize,
    layout: DataLayout,
    stats: ParserStats,
}

impl<'a> StreamParser<'a> {
    /// Create a parser using [`RECORD_SIZE`] and [`DataLayout::Orbit32`].
    pub fn new(handlers: RecordHandlers<'a>) -> Self {
        Self {
            handlers,
            record_size: RECORD_SIZE,
            layout: DataLayout::default(),
            stats: ParserStats::default(),
        }
    }

    /// Use a different record size.
    ///
    /// Windows larger than the field layouts decode normally; the extra bytes
    /// are only visible through the raw window passed to callbacks.
    pub fn with_record_size(mut self, record_size: usize) -> Result<Self> {
        if record_size == 0 {
            return Err(ReadoutError::invalid_config("record size must be non-zero"));
        }
        self.record_size = record_size;
        Ok(self)
    }

    pub fn with_data_layout(mut self, layout: DataLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn record_size(&self) -> usize {
        self.record_size
    }

    pub fn data_layout(&self) -> DataLayout {
        self.layout
    }

    pub fn stats(&self) -> &ParserStats {
        &self.stats
    }

    pub fn handlers(&self) -> &RecordHandlers<'a> {
        &self.handlers
    }

    /// Process every whole record in `chunk`, in order.
    ///
    /// Returns the number of records processed. Bytes past the last whole
    /// record are discarded.
    pub fn feed(&mut self, chunk: &[u8]) -> usize {
        let records = chunk.chunks_exact(self.record_size);
        let trailing = records.remainder().len();
        if trailing > 0 {
            debug!(
                chunk_len = chunk.len(),
                record_size = self.record_size,
                discarded = trailing,
                "Discarding trailing partial record"
            );
            self.stats.discarded_bytes += trailing as u64;
        }

        let mut processed = 0;
        for window in records {
            let kind = classify(window);
            self.stats.counts.record(kind);
            self.handlers.dispatch(kind, window, self.layout);
            processed += 1;
        }
        processed
    }
}

impl fmt::Debug for StreamParser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamParser")
            .field("handlers", &self.handlers)
            .field("record_size", &self.record_size)
            .field("layout", &self.layout)
            .field("stats", &self.stats)
            .finish()
    }
}
