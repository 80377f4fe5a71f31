//! drs4-core: Core types for DRS4 digitizer data.
//!
//! This crate provides the data model shared by the decoder (boards,
//! channels, bin-width tables, events), the timing calibration of the
//! DRS4 sampling ring and the assembly of calibrated waveforms.
//!

pub mod calibration;
pub mod channel;
pub mod error;
pub mod event;
pub mod registry;
pub mod waveform;

/// Number of sampling cells in the DRS4 ring.
pub const NUM_CELLS: usize = 1024;

/// Channels per board on the DRS4 evaluation board.
pub const DEFAULT_CHANNELS_PER_BOARD: usize = 4;

pub use calibration::{calibrate_times, first_cell_index, CalibratedTimes, TimeBase};
pub use channel::{BinWidthTable, Board, ChannelIndex};
pub use error::{Error, Result};
pub use event::{BoardTrigger, Event, EventTimestamp};
pub use registry::ChannelRegistry;
pub use waveform::{code_to_voltage, Waveform, ADC_FULL_SCALE};
