// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Inspect command - summarize or preview a finished readout log.

use std::path::PathBuf;

use clap::Subcommand;
use readoutcodec::encoding::{DataLayout, DecodedRecord, RECORD_SIZE};
use readoutcodec::io::scan::{count_types, scan_first_n, MappedLog};

use crate::common::{format_bytes, print_counts, Result};

/// Inspect file contents.
#[derive(Subcommand, Clone, Debug)]
pub enum InspectCmd {
    /// Count records of each kind
    Counts {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Record size in bytes
        #[arg(long, value_name = "BYTES", default_value_t = RECORD_SIZE)]
        record_size: usize,
    },

    /// Decode and print the first records
    Preview {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Number of records to show
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,

        /// Record size in bytes
        #[arg(long, value_name = "BYTES", default_value_t = RECORD_SIZE)]
        record_size: usize,

        /// Data record layout (orbit32 or orbit16)
        #[arg(long, value_name = "LAYOUT", default_value = "orbit32")]
        layout: DataLayout,

        /// Print one JSON object per record
        #[arg(long)]
        json: bool,
    },
}

impl InspectCmd {
    pub fn run(self) -> Result<()> {
        match self {
            InspectCmd::Counts { input, record_size } => cmd_counts(input, record_size),
            InspectCmd::Preview {
                input,
                count,
                record_size,
                layout,
                json,
            } => cmd_preview(input, count, record_size, layout, json),
        }
    }
}

/// Cmd: Count records per kind
fn cmd_counts(input: PathBuf, record_size: usize) -> Result<()> {
    let log = MappedLog::open(&input)?;
    let counts = count_types(log.data(), record_size)?;
    let trailing = log.len() % record_size;

    println!("=== {} ===", input.display());
    println!("Size: {} ({} bytes)", format_bytes(log.len() as u64), log.len());
    println!("Record size: {} bytes", record_size);
    println!();
    print_counts(&counts);
    if trailing > 0 {
        println!();
        println!("Trailing partial record: {} bytes", trailing);
    }

    Ok(())
}

/// Cmd: Preview the first records
fn cmd_preview(
    input: PathBuf,
    count: usize,
    record_size: usize,
    layout: DataLayout,
    json: bool,
) -> Result<()> {
    let log = MappedLog::open(&input)?;
    let records = scan_first_n(log.data(), count, record_size, layout)?;
    let windows = log.data().chunks_exact(record_size);

    if !json {
        println!("=== First {} records of {} ===", records.len(), input.display());
        println!();
    }

    for (index, (record, window)) in records.iter().zip(windows).enumerate() {
        if json {
            println!("{}", serde_json::to_string(record)?);
        } else {
            println!("[{:>6}] {}", index, describe(record, window));
        }
    }

    Ok(())
}

fn describe(record: &DecodedRecord, window: &[u8]) -> String {
    match record {
        DecodedRecord::Data(d) => format!(
            "DATA vldb={} bx={} orbit={} words={:08x?}",
            d.header_vldb_id, d.bx_cnt, d.ob_cnt, d.data_words
        ),
        DecodedRecord::Trigger(t) => format!("TRG  bx={} orbit={}", t.bx_cnt, t.ob_cnt),
        DecodedRecord::ReadoutHeaderL0(h) => format!(
            "L0   fee={} link={} cru={} bc={} orbit={} size={}",
            h.fee_id, h.link_id, h.cru_id, h.bc, h.orbit, h.memory_size
        ),
        DecodedRecord::ReadoutHeaderL1(h) => format!(
            "L1   trg_type={:#010x} hb_packet={} stop={} detector={:#x}",
            h.trg_type, h.hb_packet_counter, h.stop_bit, h.detector_field
        ),
        DecodedRecord::Undefined => format!("UNDEFINED {}", hex::encode(window)),
    }
}
