//! DRS4 format error types.

use crate::tag::RawTag;
use drs4_core::ChannelIndex;
use thiserror::Error;

/// Result type for DRS4 decoding.
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a tag or record violates the file layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Tag not valid in the file header.
    #[error("unrecognized header tag {0}")]
    UnrecognizedHeaderTag(RawTag),

    /// Tag not valid inside an event.
    #[error("unrecognized record tag {0}")]
    UnrecognizedRecordTag(RawTag),

    /// `TIME` marker anywhere but the start of the header.
    #[error("TIME marker after the start of the header")]
    MisplacedTimeMarker,

    /// Channel number outside the board's channel range.
    #[error("invalid channel number {number} (boards have {channels_per_board} channels)")]
    InvalidChannelNumber {
        number: u8,
        channels_per_board: usize,
    },

    /// A channel declared twice in the header.
    #[error("channel {0} declared more than once")]
    DuplicateChannel(ChannelIndex),
}

/// DRS4 decoding errors.
#[derive(Error, Debug)]
pub enum Error {
    /// The byte stream violates the file layout.
    #[error("format error at byte {offset}: {kind}")]
    Format { offset: usize, kind: FormatError },

    /// Fewer bytes left than a fixed-size field requires.
    #[error("truncated input at byte {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A channel record without a bin-width table in the header.
    #[error("channel {channel} has no bin-width table in the header")]
    ConfigMismatch { channel: ChannelIndex },

    /// Decoder configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Core library error.
    #[error("core error: {0}")]
    Core(#[from] drs4_core::Error),
}

impl Error {
    /// Maps a core error raised while handling the record at `offset`.
    ///
    /// Channel numbering errors become format errors; anything else is
    /// passed through.
    pub(crate) fn from_core_at(offset: usize, err: drs4_core::Error) -> Self {
        match err {
            drs4_core::Error::InvalidChannelNumber {
                number,
                channels_per_board,
            } => Self::Format {
                offset,
                kind: FormatError::InvalidChannelNumber {
                    number,
                    channels_per_board,
                },
            },
            drs4_core::Error::DuplicateChannel(index) => Self::Format {
                offset,
                kind: FormatError::DuplicateChannel(index),
            },
            other => Self::Core(other),
        }
    }

    /// True for layout violations.
    #[must_use]
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }

    /// True when the input ended inside a fixed-size field.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }
}
