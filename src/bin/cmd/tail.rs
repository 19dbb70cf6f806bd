// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Tail command - follow a growing readout log and decode it live.

use std::path::PathBuf;

use clap::Args;
use readoutcodec::encoding::DataLayout;
use readoutcodec::io::{RecordHandlers, RecordStream, StartPosition, TailSession, TailSink};
use readoutcodec::Config;

use crate::common::{format_bytes, format_duration, print_counts, Result, TailProgress};

/// Inactivity timeout used when neither the flag nor the config file sets one.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Follow a growing file, decoding records as they are appended.
#[derive(Args, Clone, Debug)]
pub struct TailCmd {
    /// File to follow
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Sleep between idle polls, in milliseconds
    #[arg(long, value_name = "MS")]
    poll_ms: Option<u64>,

    /// Maximum bytes per read
    #[arg(long, value_name = "BYTES")]
    chunk_size: Option<usize>,

    /// Stop after this long without new data, in milliseconds (0 disables) [default: 5000]
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Skip the existing contents and only decode new data
    #[arg(long)]
    from_end: bool,

    /// Record size in bytes
    #[arg(long, value_name = "BYTES")]
    record_size: Option<usize>,

    /// Data record layout (orbit32 or orbit16)
    #[arg(long, value_name = "LAYOUT")]
    layout: Option<DataLayout>,
}

impl TailCmd {
    pub fn run(self) -> Result<()> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        self.apply_overrides(&mut config);

        let parser = config.decode.build_parser(RecordHandlers::new())?;
        let options = config.tail.to_options();

        println!("Reading and parsing file: {}", self.input.display());
        println!(
            "Started: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );

        let mut session = TailSession::open(&self.input, options)?;
        let mut sink = ProgressSink {
            stream: RecordStream::new(parser),
            progress: TailProgress::new(),
            bytes: 0,
        };
        let stats = session.run(&mut sink, || false);
        sink.progress.finish();

        let elapsed = sink.progress.elapsed();
        let parser_stats = *sink.stream.parser().stats();

        println!();
        println!("=== Parsing summary ===");
        println!(
            "Bytes read : {} ({} bytes)",
            format_bytes(stats.bytes_delivered),
            stats.bytes_delivered
        );
        println!("Reads      : {}", stats.reads);
        println!("Reopens    : {}", stats.reopens);
        println!("Records:");
        print_counts(&parser_stats.counts);
        if sink.stream.carry_len() > 0 {
            println!("Incomplete trailing record: {} bytes", sink.stream.carry_len());
        }
        println!("Elapsed    : {}", format_duration(elapsed));

        Ok(())
    }

    fn apply_overrides(&self, config: &mut Config) {
        if let Some(ms) = self.poll_ms {
            config.tail.poll_interval_ms = ms;
        }
        if let Some(bytes) = self.chunk_size {
            config.tail.read_chunk_size = bytes;
        }
        config.tail.inactivity_timeout_ms = self
            .timeout_ms
            .or(config.tail.inactivity_timeout_ms)
            .or(Some(DEFAULT_TIMEOUT_MS));
        if self.from_end {
            config.tail.start = StartPosition::End;
        }
        if let Some(bytes) = self.record_size {
            config.decode.record_size = Some(bytes);
        }
        if let Some(layout) = self.layout {
            config.decode.data_layout = layout;
        }
    }
}

/// Feeds the record stream and keeps the progress line current.
struct ProgressSink<'a> {
    stream: RecordStream<'a>,
    progress: TailProgress,
    bytes: u64,
}

impl TailSink for ProgressSink<'_> {
    fn on_bytes(&mut self, bytes: &[u8]) {
        self.bytes += bytes.len() as u64;
        self.stream.push(bytes);
        let records = self.stream.parser().stats().counts.total();
        self.progress.update(self.bytes, records);
    }

    fn on_rotate(&mut self) {
        self.stream.on_rotate();
    }
}
