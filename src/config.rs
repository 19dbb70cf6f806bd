// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! TOML configuration for decoding and tailing.
//!
//! Every field is optional:
//!
//! ```toml
//! [decode]
//! record_size = 32
//! data_layout = "orbit32"   # or "orbit16"
//!
//! [tail]
//! read_chunk_size = 1048576
//! poll_interval_ms = 50
//! inactivity_timeout_ms = 0 # 0 or absent disables the timeout
//! start = "beginning"       # or "end"
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::encoding::layout::DataLayout;
use crate::encoding::record::RECORD_SIZE;
use crate::io::parser::{RecordHandlers, StreamParser};
use crate::io::tail::{StartPosition, TailOptions, DEFAULT_POLL_INTERVAL, DEFAULT_READ_CHUNK_SIZE};
use crate::{ReadoutError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub decode: DecodeConfig,
    pub tail: TailConfig,
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ReadoutError::OpenFailure`] if the file cannot be read,
    /// [`ReadoutError::Config`] if it is not valid TOML for this schema, and
    /// [`ReadoutError::InvalidConfig`] if a value is out of range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            fs::read_to_string(path).map_err(|e| ReadoutError::open_failure(path, e))?;
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> Result<()> {
        if self.decode.record_size == Some(0) {
            return Err(ReadoutError::invalid_config(
                "decode.record_size must be non-zero",
            ));
        }
        Ok(())
    }
}

impl FromStr for Config {
    type Err = ReadoutError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_toml_str(s)
    }
}

/// `[decode]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeConfig {
    /// Record stride; `None` means [`RECORD_SIZE`]
    pub record_size: Option<usize>,
    pub data_layout: DataLayout,
}

impl DecodeConfig {
    pub fn record_size(&self) -> usize {
        self.record_size.unwrap_or(RECORD_SIZE)
    }

    /// Build a parser with this section's record size and data layout.
    pub fn build_parser<'a>(&self, handlers: RecordHandlers<'a>) -> Result<StreamParser<'a>> {
        Ok(StreamParser::new(handlers)
            .with_record_size(self.record_size())?
            .with_data_layout(self.data_layout))
    }
}

/// `[tail]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TailConfig {
    pub read_chunk_size: usize,
    pub poll_interval_ms: u64,
    /// `None` leaves the choice to the caller; `Some(0)` disables the timeout
    pub inactivity_timeout_ms: Option<u64>,
    pub start: StartPosition,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            inactivity_timeout_ms: None,
            start: StartPosition::Beginning,
        }
    }
}

impl TailConfig {
    pub fn to_options(&self) -> TailOptions {
        let mut options = TailOptions::default()
            .with_read_chunk_size(self.read_chunk_size)
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
            .with_start(self.start);
        if let Some(ms) = self.inactivity_timeout_ms.filter(|&ms| ms > 0) {
            options = options.with_inactivity_timeout(Duration::from_millis(ms));
        }
        options.normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.decode.record_size(), RECORD_SIZE);
        assert_eq!(config.tail.to_options(), TailOptions::default());
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
[decode]
record_size = 40
data_layout = "orbit16"

[tail]
read_chunk_size = 4096
poll_interval_ms = 10
inactivity_timeout_ms = 2500
start = "end"
"#;
        let config: Config = toml.parse().unwrap();
        assert_eq!(config.decode.record_size(), 40);
        assert_eq!(config.decode.data_layout, DataLayout::Orbit16);

        let options = config.tail.to_options();
        assert_eq!(options.read_chunk_size, 4096);
        assert_eq!(options.poll_interval, Duration::from_millis(10));
        assert_eq!(options.inactivity_timeout, Some(Duration::from_millis(2500)));
        assert_eq!(options.start, StartPosition::End);
    }

    #[test]
    fn test_explicit_zero_timeout_is_kept() {
        let config = Config::from_toml_str("[tail]\ninactivity_timeout_ms = 0\n").unwrap();
        assert_eq!(config.tail.inactivity_timeout_ms, Some(0));
        assert_eq!(config.tail.to_options().inactivity_timeout, None);

        let config = Config::from_toml_str("[tail]\npoll_interval_ms = 5\n").unwrap();
        assert_eq!(config.tail.inactivity_timeout_ms, None);
    }

    #[test]
    fn test_zero_values_fall_back() {
        let config = Config::from_toml_str(
            "[tail]\nread_chunk_size = 0\npoll_interval_ms = 0\n",
        )
        .unwrap();
        let options = config.tail.to_options();
        assert_eq!(options.read_chunk_size, DEFAULT_READ_CHUNK_SIZE);
        assert_eq!(options.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(options.inactivity_timeout, None);
    }

    #[test]
    fn test_zero_record_size_rejected() {
        let result = Config::from_toml_str("[decode]\nrecord_size = 0\n");
        assert!(matches!(result, Err(ReadoutError::InvalidConfig(_))));
    }

    #[test]
    fn test_unknown_layout_rejected() {
        let result = Config::from_toml_str("[decode]\ndata_layout = \"orbit64\"\n");
        assert!(matches!(result, Err(ReadoutError::Config(_))));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = Config::from_toml_str("[tail]\npoll_ms = 5\n");
        assert!(matches!(result, Err(ReadoutError::Config(_))));
    }

    #[test]
    fn test_build_parser() {
        let config = DecodeConfig {
            record_size: Some(16),
            data_layout: DataLayout::Orbit16,
        };
        let parser = config.build_parser(RecordHandlers::new()).unwrap();
        assert_eq!(parser.record_size(), 16);
        assert_eq!(parser.data_layout(), DataLayout::Orbit16);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/readoutcodec.toml");
        assert!(matches!(result, Err(ReadoutError::OpenFailure { .. })));
    }
}
