// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Readoutcodec CLI
//!
//! Command-line tool for readout record logs.
//!
//! ## Usage
//!
//! ```sh
//! # Follow a log that is still being written
//! readoutcodec tail readout.bin --timeout-ms 5000
//!
//! # Count records per kind in a finished log
//! readoutcodec inspect counts readout.bin
//!
//! # Decode the first 20 records as JSON
//! readoutcodec inspect preview readout.bin -n 20 --json
//! ```

mod cmd;
mod common;

use std::process;

use clap::{Parser, Subcommand};
use cmd::{InspectCmd, TailCmd};
use common::Result;

/// Readoutcodec - readout record decoder
///
/// Decode fixed-size binary readout records from growing or finished logs.
#[derive(Parser, Clone)]
#[command(name = "readoutcodec")]
#[command(about = "Decoder for binary readout record logs", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Follow a growing file and decode records as they arrive
    Tail(TailCmd),

    /// Inspect a finished file (counts, preview)
    #[command(subcommand)]
    Inspect(InspectCmd),
}

fn run(cli: Cli) -> Result<()> {
    common::init_logging(cli.verbose);

    match cli.command {
        Commands::Tail(cmd) => cmd.run(),
        Commands::Inspect(cmd) => cmd.run(),
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // Help and version go to stdout with status 0; usage errors exit 1.
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            process::exit(1);
        }
    };

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
