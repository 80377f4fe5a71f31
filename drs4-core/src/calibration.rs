//! Timing calibration for the DRS4 sampling ring.
//!
//! The DRS4 chip samples into a ring of [`NUM_CELLS`] capacitors. On trigger
//! the ring stops and readout starts at the trigger cell, so sample `i` of an
//! event was taken by cell `(i + trigger_cell) % NUM_CELLS`. Each cell has
//! its own calibrated width; the time of a sample is the accumulated width
//! of the cells read before it.

use crate::{BinWidthTable, NUM_CELLS};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rule used to turn rotated bin widths into sample times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum TimeBase {
    /// Cumulative sum over two ring revolutions, keeping every even entry.
    /// Adjacent cells are read out as averaged pairs, so only even
    /// cumulative positions are sample boundaries.
    #[default]
    PairAveraged,
    /// `t[0] = 0`, `t[i] = t[i-1] + width(i - 1 + trigger_cell)`.
    CellSum,
}

/// Sample times of one channel for one event.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibratedTimes {
    times: Vec<f64>,
    first_cell: usize,
    first_cell_time: f64,
}

impl CalibratedTimes {
    /// Calibrated times, one per sample.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.times
    }

    /// Time of the sample taken by physical cell 0.
    #[inline]
    #[must_use]
    pub fn first_cell_time(&self) -> f64 {
        self.first_cell_time
    }

    /// Shifts all times so that the first-cell time equals `reference`.
    ///
    /// Channels sharing a board are aligned to the board's reference
    /// channel this way.
    pub fn align_to(&mut self, reference: f64) {
        let shift = self.first_cell_time - reference;
        for t in &mut self.times {
            *t -= shift;
        }
        // Subtraction may round; the first cell must match bit for bit.
        let fc = self.first_cell;
        self.times[fc] = reference;
        if fc > 0 && self.times[fc - 1] > reference {
            self.times[fc - 1] = reference;
        }
        if fc + 1 < self.times.len() && self.times[fc + 1] < reference {
            self.times[fc + 1] = reference;
        }
        self.first_cell_time = reference;
    }

    /// Consumes the calibration and returns the times.
    #[must_use]
    pub fn into_vec(self) -> Vec<f64> {
        self.times
    }
}

/// Index of the sample taken by physical cell 0.
#[inline]
#[must_use]
pub fn first_cell_index(trigger_cell: u16) -> usize {
    (NUM_CELLS - usize::from(trigger_cell) % NUM_CELLS) % NUM_CELLS
}

/// Reconstructs sample times for one channel from its bin widths and the
/// board's trigger cell. The trigger cell is taken modulo [`NUM_CELLS`].
#[must_use]
pub fn calibrate_times(
    table: &BinWidthTable,
    trigger_cell: u16,
    time_base: TimeBase,
) -> CalibratedTimes {
    let offset = usize::from(trigger_cell) % NUM_CELLS;
    let widths = table.as_slice();
    let mut times = Vec::with_capacity(NUM_CELLS);

    match time_base {
        TimeBase::PairAveraged => {
            // Rotated table concatenated with itself, accumulated; even entries only.
            let mut sum = 0.0f64;
            for k in 0..2 * NUM_CELLS {
                sum += f64::from(widths[(k + offset) % NUM_CELLS]);
                if k % 2 == 0 {
                    times.push(sum);
                }
            }
        }
        TimeBase::CellSum => {
            let mut sum = 0.0f64;
            times.push(sum);
            for k in 0..NUM_CELLS - 1 {
                sum += f64::from(widths[(k + offset) % NUM_CELLS]);
                times.push(sum);
            }
        }
    }

    let first_cell = first_cell_index(trigger_cell);
    let first_cell_time = times[first_cell];
    CalibratedTimes {
        times,
        first_cell,
        first_cell_time,
    }
}
