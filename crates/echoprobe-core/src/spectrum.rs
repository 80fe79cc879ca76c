//! Frequency response derivation
//!
//! Transforms an impulse response estimate into a complex spectrum with a
//! matching frequency axis. The half-range convention (bins up to Nyquist)
//! is the default: the analytic reference path is only defined up to
//! Nyquist, so comparison plots line up. The full-range convention stays
//! available behind the flag for displays that want the mirrored half.
//!
//! ## Example
//!
//! ```rust
//! use echoprobe_core::spectrum::{spectrum, SpectrumConvention};
//!
//! let impulse = vec![1.0, 0.0, 0.0, 0.0];
//! let fr = spectrum(&impulse, 48_000.0, SpectrumConvention::HalfRange);
//! assert_eq!(fr.frequencies.len(), 3); // bins 0, fs/4, Nyquist
//! assert!(fr.magnitude_db().iter().all(|&db| db.abs() < 1e-9));
//! ```

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::fft::FftProcessor;

/// Floor applied before taking logs so exact zeros stay finite.
const DB_FLOOR: f64 = 1e-15;

/// Which part of the spectrum to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpectrumConvention {
    /// Bins 0 ..= N/2, frequency axis from 0 to Nyquist.
    #[default]
    HalfRange,
    /// All N bins, frequency axis from 0 to the sample rate.
    FullRange,
}

/// A complex frequency response with its frequency axis.
#[derive(Debug, Clone)]
pub struct FrequencyResponse {
    /// Bin frequencies in Hz.
    pub frequencies: Vec<f64>,
    /// Complex response per bin.
    pub response: Vec<Complex64>,
}

impl FrequencyResponse {
    /// Magnitude per bin as `20 * log10(|H|)`, floored on exact zeros.
    pub fn magnitude_db(&self) -> Vec<f64> {
        self.response
            .iter()
            .map(|h| 20.0 * h.norm().max(DB_FLOOR).log10())
            .collect()
    }

    /// Phase per bin in radians.
    pub fn phase(&self) -> Vec<f64> {
        self.response.iter().map(|h| h.arg()).collect()
    }

    pub fn len(&self) -> usize {
        self.response.len()
    }

    pub fn is_empty(&self) -> bool {
        self.response.is_empty()
    }
}

/// Derive the frequency response of an impulse response by DFT.
///
/// The transform length equals the impulse response length (no padding),
/// so bin spacing is `sample_rate / len`. Returns an empty response for
/// empty input.
pub fn spectrum(impulse: &[f64], sample_rate: f64, convention: SpectrumConvention) -> FrequencyResponse {
    let n = impulse.len();
    if n == 0 {
        return FrequencyResponse {
            frequencies: Vec::new(),
            response: Vec::new(),
        };
    }

    let mut fft = FftProcessor::new(n);
    let bins = fft.fft_real(impulse);

    let keep = match convention {
        SpectrumConvention::HalfRange => n / 2 + 1,
        SpectrumConvention::FullRange => n,
    };
    let frequencies = (0..keep).map(|i| i as f64 * sample_rate / n as f64).collect();
    let response = bins.into_iter().take(keep).collect();

    FrequencyResponse {
        frequencies,
        response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_half_range_axis() {
        let impulse = vec![0.0; 96];
        let fr = spectrum(&impulse, 48_000.0, SpectrumConvention::HalfRange);
        assert_eq!(fr.len(), 49);
        assert_eq!(fr.frequencies[0], 0.0);
        assert!((fr.frequencies[1] - 500.0).abs() < 1e-9);
        assert!((fr.frequencies[48] - 24_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_full_range_axis() {
        let impulse = vec![0.0; 96];
        let fr = spectrum(&impulse, 48_000.0, SpectrumConvention::FullRange);
        assert_eq!(fr.len(), 96);
        assert!((fr.frequencies[95] - 47_500.0).abs() < 1e-9);
    }

    #[test]
    fn test_unit_impulse_is_flat() {
        let mut impulse = vec![0.0; 64];
        impulse[0] = 1.0;
        let fr = spectrum(&impulse, 48_000.0, SpectrumConvention::HalfRange);
        for db in fr.magnitude_db() {
            assert!(db.abs() < 1e-9, "unit impulse should be 0 dB, got {}", db);
        }
    }

    #[test]
    fn test_tone_concentrates_in_one_bin() {
        let n = 128;
        let bin = 9;
        let impulse: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * bin as f64 * i as f64 / n as f64).cos())
            .collect();
        let fr = spectrum(&impulse, 48_000.0, SpectrumConvention::HalfRange);
        let mags = fr.magnitude_db();
        let peak = mags
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, bin);
    }

    #[test]
    fn test_zero_signal_stays_finite() {
        let fr = spectrum(&vec![0.0; 32], 48_000.0, SpectrumConvention::HalfRange);
        for db in fr.magnitude_db() {
            assert!(db.is_finite(), "dB floor must keep zeros finite");
            assert!(db <= -290.0);
        }
    }

    #[test]
    fn test_empty_input() {
        let fr = spectrum(&[], 48_000.0, SpectrumConvention::HalfRange);
        assert!(fr.is_empty());
    }

    #[test]
    fn test_phase_of_delay() {
        // One-sample delay: phase -omega at each bin.
        let mut impulse = vec![0.0; 64];
        impulse[1] = 1.0;
        let fr = spectrum(&impulse, 48_000.0, SpectrumConvention::HalfRange);
        let phases = fr.phase();
        for (i, &p) in phases.iter().enumerate().take(32).skip(1) {
            let expected = -2.0 * PI * i as f64 / 64.0;
            let diff = (p - expected).rem_euclid(2.0 * PI);
            let diff = diff.min(2.0 * PI - diff);
            assert!(diff < 1e-9, "bin {}: phase {} vs {}", i, p, expected);
        }
    }
}
