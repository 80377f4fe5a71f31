//! Decoded DRS4 events.

use crate::{ChannelIndex, Waveform};
use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Coarse event timestamp as written by the DRS4 software.
///
/// The eight 16-bit words are year, month, day, hour, minute, second,
/// millisecond and the input range setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventTimestamp {
    /// Raw timestamp words.
    pub words: [u16; 8],
}

impl EventTimestamp {
    /// Creates a timestamp from its raw words.
    #[must_use]
    pub fn from_words(words: [u16; 8]) -> Self {
        Self { words }
    }

    #[must_use]
    pub fn year(&self) -> u16 {
        self.words[0]
    }

    #[must_use]
    pub fn month(&self) -> u16 {
        self.words[1]
    }

    #[must_use]
    pub fn day(&self) -> u16 {
        self.words[2]
    }

    #[must_use]
    pub fn hour(&self) -> u16 {
        self.words[3]
    }

    #[must_use]
    pub fn minute(&self) -> u16 {
        self.words[4]
    }

    #[must_use]
    pub fn second(&self) -> u16 {
        self.words[5]
    }

    #[must_use]
    pub fn millisecond(&self) -> u16 {
        self.words[6]
    }

    /// Input range setting (the eighth word).
    #[must_use]
    pub fn range(&self) -> u16 {
        self.words[7]
    }
}

impl fmt::Display for EventTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}",
            self.year(),
            self.month(),
            self.day(),
            self.hour(),
            self.minute(),
            self.second(),
            self.millisecond()
        )
    }
}

/// Per-board trigger information of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardTrigger {
    /// Board ordinal within the file.
    pub ordinal: usize,
    /// Serial number carried by the board record, if any.
    pub serial: Option<u16>,
    /// Trigger cell, already reduced modulo the ring size.
    pub trigger_cell: u16,
}

/// One triggered acquisition across all boards.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Event {
    /// Event serial number.
    pub serial: u32,
    /// Coarse timestamp.
    pub timestamp: EventTimestamp,
    /// Trigger information, one entry per board seen in the event.
    pub boards: Vec<BoardTrigger>,
    /// Calibrated waveforms keyed by channel index.
    pub channels: BTreeMap<ChannelIndex, Waveform>,
}

impl Event {
    /// Creates an event without boards or channels.
    #[must_use]
    pub fn new(serial: u32, timestamp: EventTimestamp) -> Self {
        Self {
            serial,
            timestamp,
            boards: Vec::new(),
            channels: BTreeMap::new(),
        }
    }

    /// Returns the waveform of a channel.
    #[must_use]
    pub fn channel(&self, index: ChannelIndex) -> Option<&Waveform> {
        self.channels.get(&index)
    }

    /// Number of channels with data in this event.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Trigger cell of a board, if the board was present in this event.
    #[must_use]
    pub fn trigger_cell(&self, board_ordinal: usize) -> Option<u16> {
        self.boards
            .iter()
            .find(|b| b.ordinal == board_ordinal)
            .map(|b| b.trigger_cell)
    }
}
