//! Channel, board and bin-width table types.

use crate::{Error, Result, NUM_CELLS};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Normalized, 0-based global channel index.
///
/// Channel `n` (1-based, as written in a `Cxxx` tag) of board ordinal `b`
/// maps to `(n - 1) + b * channels_per_board`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelIndex(pub usize);

impl ChannelIndex {
    /// Creates a channel index from its raw value.
    #[inline]
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Computes the global index of channel `number` on board `board_ordinal`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidChannelNumber`] if `number` is not in
    /// `1..=channels_per_board`.
    pub fn from_board_slot(
        board_ordinal: usize,
        number: u8,
        channels_per_board: usize,
    ) -> Result<Self> {
        let slot = usize::from(number);
        if slot == 0 || slot > channels_per_board {
            return Err(Error::InvalidChannelNumber {
                number,
                channels_per_board,
            });
        }
        Ok(Self(slot - 1 + board_ordinal * channels_per_board))
    }

    /// Returns the raw index value.
    #[inline]
    #[must_use]
    pub fn as_usize(&self) -> usize {
        self.0
    }

    /// Ordinal of the board owning this channel.
    #[inline]
    #[must_use]
    pub fn board_ordinal(&self, channels_per_board: usize) -> usize {
        self.0 / channels_per_board
    }
}

impl fmt::Display for ChannelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-cell time-bin widths of one channel, in nanoseconds.
///
/// Measured once per channel and stored in the file header. The table is
/// immutable after construction and always holds exactly [`NUM_CELLS`]
/// entries.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BinWidthTable {
    widths: Vec<f32>,
}

impl BinWidthTable {
    /// Creates a table from a vector of widths.
    ///
    /// # Errors
    /// Returns [`Error::InvalidTableLength`] unless `widths` has exactly
    /// [`NUM_CELLS`] entries.
    pub fn new(widths: Vec<f32>) -> Result<Self> {
        if widths.len() != NUM_CELLS {
            return Err(Error::InvalidTableLength(widths.len()));
        }
        Ok(Self { widths })
    }

    /// Creates a table where every cell has the same width.
    #[must_use]
    pub fn uniform(width: f32) -> Self {
        Self {
            widths: vec![width; NUM_CELLS],
        }
    }

    /// Returns the widths as a slice of length [`NUM_CELLS`].
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.widths
    }

    /// Width of `cell`, wrapping around the ring.
    #[inline]
    #[must_use]
    pub fn width(&self, cell: usize) -> f32 {
        self.widths[cell % NUM_CELLS]
    }

    /// Duration of one full revolution of the sampling ring.
    #[must_use]
    pub fn period(&self) -> f64 {
        self.widths.iter().map(|&w| f64::from(w)).sum()
    }
}

/// One digitizer board declared in the file header.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Board {
    /// Position of the board in discovery order.
    pub ordinal: usize,
    /// Board serial number; `None` for an implicit board whose channels
    /// were declared before any board tag.
    pub serial: Option<u16>,
    /// Channels owned by this board, in declaration order.
    pub channels: Vec<ChannelIndex>,
}

impl Board {
    /// Creates a board without channels.
    #[must_use]
    pub fn new(ordinal: usize, serial: Option<u16>) -> Self {
        Self {
            ordinal,
            serial,
            channels: Vec::new(),
        }
    }
}
