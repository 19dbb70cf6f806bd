// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for CLI commands.

use std::io::IsTerminal as _;
use std::time::{Duration, Instant};

use readoutcodec::io::RecordCounts;
use tracing::Level;

pub use anyhow::Result as CliResult;
pub type Result<T = ()> = CliResult<T>;

/// Minimum gap between plain-text progress lines.
const PLAIN_PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// Install the stderr log subscriber. `verbosity` counts `-v` flags.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

/// Format a duration to human-readable string.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 3600 {
        let hours = secs / 3600;
        let minutes = (secs % 3600) / 60;
        format!("{}h {}m", hours, minutes)
    } else if secs >= 60 {
        let minutes = secs / 60;
        let remaining_secs = secs % 60;
        format!("{}m {}s", minutes, remaining_secs)
    } else if secs > 0 {
        format!("{}.{:03}s", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}

/// Format a byte count with a binary unit.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// Print per-kind record counts, one line per kind.
pub fn print_counts(counts: &RecordCounts) {
    println!("  L0 headers : {}", counts.readout_header_l0);
    println!("  L1 headers : {}", counts.readout_header_l1);
    println!("  Triggers   : {}", counts.trigger);
    println!("  Data       : {}", counts.data);
    println!("  Undefined  : {}", counts.undefined);
    println!("  Total      : {}", counts.total());
}

/// Progress line for a running tail.
///
/// A spinner on an interactive stderr, otherwise a plain `[Progress]` line
/// at most once per second.
pub struct TailProgress {
    spinner: Option<indicatif::ProgressBar>,
    started: Instant,
    last_plain: Option<Instant>,
}

impl TailProgress {
    pub fn new() -> Self {
        let spinner = if std::io::stderr().is_terminal() {
            let pb = indicatif::ProgressBar::new_spinner();
            if let Ok(style) = indicatif::ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
            {
                pb.set_style(style);
            }
            pb.enable_steady_tick(Duration::from_millis(120));
            Some(pb)
        } else {
            None
        };

        Self {
            spinner,
            started: Instant::now(),
            last_plain: None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn update(&mut self, bytes: u64, records: u64) {
        let msg = format!("{} read, {} records parsed", format_bytes(bytes), records);
        match &self.spinner {
            Some(pb) => pb.set_message(msg),
            None => {
                let due = self
                    .last_plain
                    .map_or(true, |at| at.elapsed() >= PLAIN_PROGRESS_INTERVAL);
                if due {
                    eprintln!(
                        "[Progress] {}, elapsed: {}",
                        msg,
                        format_duration(self.elapsed())
                    );
                    self.last_plain = Some(Instant::now());
                }
            }
        }
    }

    pub fn finish(&self) {
        if let Some(pb) = &self.spinner {
            pb.finish_and_clear();
        }
    }
}
