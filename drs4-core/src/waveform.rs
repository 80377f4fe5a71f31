//! Calibrated waveforms.
//!
//! A [`Waveform`] stores the samples of one channel for one event in
//! columnar form: one vector of times and one of voltages.

use crate::calibration::CalibratedTimes;
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Full-scale ADC code.
pub const ADC_FULL_SCALE: f64 = 65535.0;

/// Converts a raw 16-bit sample code into a normalized voltage.
///
/// Code 0 maps to -0.5 and code 65535 to 0.5.
#[inline]
#[must_use]
pub fn code_to_voltage(code: u16) -> f64 {
    f64::from(code) / ADC_FULL_SCALE - 0.5
}

/// Calibrated samples of one channel in one event.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Waveform {
    /// Sample times in nanoseconds.
    pub times: Vec<f64>,
    /// Normalized voltages.
    pub voltages: Vec<f64>,
    /// Channel scaler read with the samples.
    pub scaler: u32,
}

impl Waveform {
    /// Pairs calibrated times with the voltages of `codes`.
    ///
    /// # Errors
    /// Returns [`Error::SampleCountMismatch`] if the lengths differ.
    pub fn assemble(times: CalibratedTimes, codes: &[u16], scaler: u32) -> Result<Self> {
        let times = times.into_vec();
        if times.len() != codes.len() {
            return Err(Error::SampleCountMismatch {
                times: times.len(),
                samples: codes.len(),
            });
        }
        Ok(Self {
            times,
            voltages: codes.iter().map(|&code| code_to_voltage(code)).collect(),
            scaler,
        })
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Returns true if the waveform has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Iterates over `(time, voltage)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times
            .iter()
            .copied()
            .zip(self.voltages.iter().copied())
    }

    /// Smallest and largest voltage, or `None` for an empty waveform.
    #[must_use]
    pub fn voltage_range(&self) -> Option<(f64, f64)> {
        let first = *self.voltages.first()?;
        Some(
            self.voltages
                .iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{calibrate_times, TimeBase};
    use crate::{BinWidthTable, NUM_CELLS};
    use approx::assert_relative_eq;

    #[test]
    fn test_code_to_voltage_bounds() {
        assert_relative_eq!(code_to_voltage(0), -0.5);
        assert_relative_eq!(code_to_voltage(65535), 0.5);
        assert_relative_eq!(code_to_voltage(32768), 0.5 / 65535.0, epsilon = 1e-12);
        assert!(code_to_voltage(65534) < 0.5);
    }

    #[test]
    fn test_assemble_pairs_times_and_voltages() {
        let times = calibrate_times(&BinWidthTable::uniform(0.2), 0, TimeBase::CellSum);
        let codes = vec![32768u16; NUM_CELLS];

        let wf = Waveform::assemble(times, &codes, 7).unwrap();
        assert_eq!(wf.len(), NUM_CELLS);
        assert_eq!(wf.scaler, 7);

        let (t, v) = wf.iter().nth(3).unwrap();
        assert_relative_eq!(t, 0.6, epsilon = 1e-6);
        assert_relative_eq!(v, 0.000_007_63, epsilon = 1e-8);
    }

    #[test]
    fn test_assemble_rejects_length_mismatch() {
        let times = calibrate_times(&BinWidthTable::uniform(0.2), 0, TimeBase::CellSum);
        assert!(matches!(
            Waveform::assemble(times, &[0u16; 10], 0),
            Err(Error::SampleCountMismatch {
                times: NUM_CELLS,
                samples: 10
            })
        ));
    }

    #[test]
    fn test_voltage_range() {
        let wf = Waveform {
            times: vec![0.0, 1.0, 2.0],
            voltages: vec![0.1, -0.3, 0.2],
            scaler: 0,
        };
        assert_eq!(wf.voltage_range(), Some((-0.3, 0.2)));
        assert_eq!(Waveform::default().voltage_range(), None);
    }
}
