//! drs4-format: DRS4 binary file decoder.
//!
//! This crate parses the binary files written by DRS4 evaluation-board
//! software into calibrated events.
//!
//! # Key Components
//!
//! - [`parse_header`] - Reads boards, channels and bin-width tables
//! - [`EventStreamReader`] - State machine yielding one [`Event`] per record
//! - [`OutputCollector`] - Accumulates decoded events
//!
//! # Decoding Pipeline
//!
//! 1. **Header**: register boards and channels, load bin-width tables
//! 2. **Events**: split the stream into events and channel records
//! 3. **Calibration**: rotate and accumulate bin widths per trigger cell,
//!    align the channels of each board
//! 4. **Assembly**: pair calibrated times with normalized voltages

pub mod collector;
mod config;
pub mod cursor;
mod error;
pub mod header;
pub mod stream;
pub mod tag;

pub use collector::{DecodedRun, OutputCollector};
pub use config::DecoderConfig;
pub use cursor::ByteCursor;
pub use error::{Error, FormatError, Result};
pub use header::{parse_header, Header};
pub use stream::{EventStreamReader, ReaderState};
pub use tag::RawTag;

// Re-export core types for convenience
pub use drs4_core::{ChannelIndex, Event, Waveform};

/// Decodes a complete DRS4 file held in memory.
///
/// # Errors
/// Returns the first header or event decoding error. Use
/// [`EventStreamReader`] with an [`OutputCollector`] to keep the events
/// decoded before a failure.
pub fn decode(data: &[u8], config: &DecoderConfig) -> Result<DecodedRun> {
    let mut reader = EventStreamReader::new(data, config.clone())?;
    let mut collector = OutputCollector::new();
    collector.drain_from(&mut reader)?;
    Ok(DecodedRun {
        header: reader.into_header(),
        events: collector.into_events(),
    })
}
