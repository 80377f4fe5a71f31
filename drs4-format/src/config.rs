//! Decoder configuration.

use crate::{Error, Result};
use drs4_core::{TimeBase, DEFAULT_CHANNELS_PER_BOARD};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Largest channel number a `Cxxx` tag can carry in its final digit.
const MAX_CHANNELS_PER_BOARD: usize = 9;

/// Configuration for decoding DRS4 files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Channels per board; determines global channel indices.
    pub channels_per_board: usize,
    /// Time base used for timing calibration.
    pub time_base: TimeBase,
    /// Align each board's channels to its reference channel.
    pub align_channels: bool,
    /// Emit the event still open when the stream ends.
    ///
    /// DRS4 software writes no sentinel after the last event, so with the
    /// default `false` the final acquisition of a file is dropped.
    pub flush_trailing_event: bool,
    /// Log progress every this many event serials (0 disables).
    pub progress_interval: u32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            channels_per_board: DEFAULT_CHANNELS_PER_BOARD,
            time_base: TimeBase::PairAveraged,
            align_channels: true,
            flush_trailing_event: false,
            progress_interval: 10,
        }
    }
}

impl DecoderConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of channels per board.
    #[must_use]
    pub fn with_channels_per_board(mut self, channels_per_board: usize) -> Self {
        self.channels_per_board = channels_per_board;
        self
    }

    /// Sets the time base.
    #[must_use]
    pub fn with_time_base(mut self, time_base: TimeBase) -> Self {
        self.time_base = time_base;
        self
    }

    /// Sets whether channels are aligned per board.
    #[must_use]
    pub fn with_align_channels(mut self, align: bool) -> Self {
        self.align_channels = align;
        self
    }

    /// Sets whether the trailing open event is emitted at end of stream.
    #[must_use]
    pub fn with_flush_trailing_event(mut self, flush: bool) -> Self {
        self.flush_trailing_event = flush;
        self
    }

    /// Sets the progress logging interval.
    #[must_use]
    pub fn with_progress_interval(mut self, interval: u32) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Checks that the configuration can describe a DRS4 file.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if `channels_per_board` is 0 or larger than
    /// a channel tag can address.
    pub fn validate(&self) -> Result<()> {
        if self.channels_per_board == 0 || self.channels_per_board > MAX_CHANNELS_PER_BOARD {
            return Err(Error::Config(format!(
                "channels_per_board must be in 1..={MAX_CHANNELS_PER_BOARD}, got {}",
                self.channels_per_board
            )));
        }
        Ok(())
    }

    /// Loads a configuration from a JSON file. Missing fields take their
    /// default values.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// fails [`validate`](Self::validate).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a JSON string.
    ///
    /// # Errors
    /// Returns an error if the string is not valid JSON or fails
    /// [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
