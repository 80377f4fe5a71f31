//! Error types for drs4-core.

use crate::ChannelIndex;
use thiserror::Error;

/// Result type alias for drs4-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for DRS4 data handling.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A bin-width table did not hold exactly one width per sampling cell.
    #[error("bin-width table has {0} entries, expected {expected}", expected = crate::NUM_CELLS)]
    InvalidTableLength(usize),

    /// Channel number outside `1..=channels_per_board`.
    #[error("invalid channel number {number} (boards have {channels_per_board} channels)")]
    InvalidChannelNumber {
        number: u8,
        channels_per_board: usize,
    },

    /// The same channel was declared twice.
    #[error("channel {0} declared more than once")]
    DuplicateChannel(ChannelIndex),

    /// Times and sample codes of a waveform differ in length.
    #[error("waveform has {times} times but {samples} samples")]
    SampleCountMismatch { times: usize, samples: usize },
}
