//! Impulse response estimation by cross-correlation
//!
//! A system driven by a white, zero-mean bipolar sequence has its impulse
//! response exposed, up to scale, in the cross-correlation between the
//! excitation and the response. Maximal-length PRBS excitation approximates
//! that white autocorrelation away from the wrap-around boundary, which is
//! what the [`crate::prbs`] module provides.
//!
//! The estimator takes the full linear cross-correlation of response
//! against excitation, keeps the causal (non-negative lag) half, truncates
//! it to the configured analysis window and scales it. Truncation is a
//! deliberate approximation: outside the main response the PRBS correlation
//! carries a slowly decaying non-impulsive floor that the window discards.
//!
//! ## Example
//!
//! ```rust
//! use echoprobe_core::estimator::{EstimatorConfig, ImpulseEstimator};
//! use echoprobe_core::prbs::{generate, PrbsOrder};
//!
//! let excitation = generate(PrbsOrder::Order9, 511, 1).unwrap();
//! // Identity system: the response is the excitation itself.
//! let config = EstimatorConfig {
//!     sample_rate: 48_000.0,
//!     window_samples: 32,
//!     ..EstimatorConfig::default()
//! };
//! let estimator = ImpulseEstimator::new(config).unwrap();
//! let impulse = estimator.estimate(&excitation, &excitation).unwrap();
//! assert_eq!(impulse.samples.len(), 32);
//! assert!((impulse.samples[0] - 1.0).abs() < 0.01);
//! ```

use serde::{Deserialize, Serialize};

use crate::correlate::cross_correlate;
use crate::types::{SysIdError, SysIdResult};

/// Amplitude convention for the raw correlation.
///
/// Raw correlation amplitude grows with the excitation length and is not
/// unit-gain by itself. Dividing by the excitation energy (for a bipolar
/// sequence, its length) is the convention under which the estimate
/// converges to the analytic impulse response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Normalization {
    /// Keep the raw correlation amplitude.
    Raw,
    /// Divide by the excitation energy (sum of squared samples).
    #[default]
    ExcitationEnergy,
}

/// Estimator settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Sample rate in Hz, used for the time axis.
    pub sample_rate: f64,
    /// Analysis window length in samples.
    pub window_samples: usize,
    /// Amplitude convention.
    pub normalization: Normalization,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            window_samples: 480,
            normalization: Normalization::ExcitationEnergy,
        }
    }
}

impl EstimatorConfig {
    /// Derive the window from a settling-time duration in seconds.
    pub fn with_settling_time(sample_rate: f64, settling_time_s: f64) -> Self {
        Self {
            sample_rate,
            window_samples: (settling_time_s * sample_rate).round() as usize,
            normalization: Normalization::default(),
        }
    }
}

/// An estimated (or analytic) impulse response with its time axis.
#[derive(Debug, Clone)]
pub struct ImpulseResponse {
    /// Timestamps in seconds, linearly spaced from 0 at 1/sample_rate steps.
    pub time: Vec<f64>,
    /// Impulse response samples.
    pub samples: Vec<f64>,
    /// Sample rate the axis was built from.
    pub sample_rate: f64,
}

impl ImpulseResponse {
    /// Build a response from samples, deriving the time axis.
    pub fn from_samples(samples: Vec<f64>, sample_rate: f64) -> Self {
        let time = (0..samples.len()).map(|i| i as f64 / sample_rate).collect();
        Self {
            time,
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Cross-correlation impulse response estimator.
///
/// Stateless: every call is a pure function of its inputs and the config.
#[derive(Debug, Clone)]
pub struct ImpulseEstimator {
    config: EstimatorConfig,
}

impl ImpulseEstimator {
    /// Validate the config and build an estimator.
    pub fn new(config: EstimatorConfig) -> SysIdResult<Self> {
        if config.window_samples == 0 {
            return Err(SysIdError::InvalidWindow(0));
        }
        if !(config.sample_rate.is_finite() && config.sample_rate > 0.0) {
            return Err(SysIdError::InvalidConfig(format!(
                "sample rate must be positive, got {}",
                config.sample_rate
            )));
        }
        Ok(Self { config })
    }

    /// Estimator settings.
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Estimate the impulse response from an excitation/response pair.
    ///
    /// The response may be longer than the excitation (repetition, trailing
    /// capture); extra samples sharpen the estimate of the later lags.
    /// Fails with `InsufficientData` when the response is shorter than the
    /// excitation or cannot cover the analysis window.
    pub fn estimate(&self, excitation: &[f64], response: &[f64]) -> SysIdResult<ImpulseResponse> {
        let causal = self.causal_correlation(excitation, response)?;
        let samples = match self.config.normalization {
            Normalization::Raw => causal,
            Normalization::ExcitationEnergy => {
                let energy: f64 = excitation.iter().map(|&x| x * x).sum();
                if energy <= 0.0 {
                    return Err(SysIdError::DegenerateSignal("zero-energy excitation"));
                }
                causal.into_iter().map(|v| v / energy).collect()
            }
        };
        Ok(ImpulseResponse::from_samples(samples, self.config.sample_rate))
    }

    /// Estimate and scale so the windowed sum matches a reference response.
    ///
    /// Used in validation mode: the sum of the estimate over the analysis
    /// window is forced equal to the sum of the reference over the same
    /// span, correcting the length-dependent raw correlation gain. A sum
    /// too close to zero on either side fails with `DegenerateSignal`
    /// instead of producing NaN or Inf samples.
    pub fn estimate_matched(
        &self,
        excitation: &[f64],
        response: &[f64],
        reference: &[f64],
    ) -> SysIdResult<ImpulseResponse> {
        let causal = self.causal_correlation(excitation, response)?;

        let span = causal.len().min(reference.len());
        let sum_ref: f64 = reference[..span].iter().sum();
        let sum_est: f64 = causal.iter().sum();
        if sum_est.abs() < 1e-12 {
            return Err(SysIdError::DegenerateSignal(
                "estimate sums to zero; cannot scale to reference",
            ));
        }
        if sum_ref.abs() < 1e-12 {
            return Err(SysIdError::DegenerateSignal(
                "reference impulse response sums to zero",
            ));
        }

        let scale = sum_ref / sum_est;
        let samples = causal.into_iter().map(|v| v * scale).collect();
        Ok(ImpulseResponse::from_samples(samples, self.config.sample_rate))
    }

    /// Causal half of the full cross-correlation, cut to the window.
    fn causal_correlation(&self, excitation: &[f64], response: &[f64]) -> SysIdResult<Vec<f64>> {
        if excitation.is_empty() {
            return Err(SysIdError::DegenerateSignal("empty excitation"));
        }
        if response.len() < excitation.len() {
            return Err(SysIdError::InsufficientData {
                needed: excitation.len(),
                actual: response.len(),
            });
        }
        let window = self.config.window_samples;
        if response.len() < window {
            return Err(SysIdError::InsufficientData {
                needed: window,
                actual: response.len(),
            });
        }

        let full = cross_correlate(response, excitation);
        // Zero lag sits at excitation.len() - 1; everything before it is
        // the anti-causal half.
        let causal = &full[excitation.len() - 1..];
        Ok(causal[..window].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::butterworth_lowpass;
    use crate::prbs::{generate, PrbsOrder};

    const FS: f64 = 48_000.0;

    fn estimator(window: usize) -> ImpulseEstimator {
        ImpulseEstimator::new(EstimatorConfig {
            sample_rate: FS,
            window_samples: window,
            normalization: Normalization::ExcitationEnergy,
        })
        .unwrap()
    }

    #[test]
    fn test_window_truncation_is_exact() {
        let excitation = generate(PrbsOrder::Order9, 511, 1).unwrap();
        for window in [1usize, 17, 100, 511] {
            let impulse = estimator(window).estimate(&excitation, &excitation).unwrap();
            assert_eq!(impulse.samples.len(), window);
            assert_eq!(impulse.time.len(), window);
        }
    }

    #[test]
    fn test_time_axis_spacing() {
        let excitation = generate(PrbsOrder::Order7, 127, 1).unwrap();
        let impulse = estimator(10).estimate(&excitation, &excitation).unwrap();
        assert_eq!(impulse.time[0], 0.0);
        assert!((impulse.time[1] - 1.0 / FS).abs() < 1e-15);
        assert!((impulse.time[9] - 9.0 / FS).abs() < 1e-12);
    }

    #[test]
    fn test_identity_system_yields_unit_tap() {
        let excitation = generate(PrbsOrder::Order15, 32767, 1).unwrap();
        let impulse = estimator(64).estimate(&excitation, &excitation).unwrap();
        assert!(
            (impulse.samples[0] - 1.0).abs() < 1e-3,
            "zero-lag tap should be ~1, got {}",
            impulse.samples[0]
        );
        for &v in &impulse.samples[1..] {
            assert!(v.abs() < 0.04, "off-peak tap too large: {}", v);
        }
    }

    #[test]
    fn test_roundtrip_against_analytic_filter() {
        // The core end-to-end property: a long PRBS through a known filter
        // must reproduce the analytic impulse response inside the window.
        let filter = butterworth_lowpass(4, 10_000.0, FS);
        let excitation = generate(PrbsOrder::Order15, 32767, 1).unwrap();
        let response = filter.filter(&excitation);

        let window = 480;
        let impulse = estimator(window).estimate(&excitation, &response).unwrap();
        let reference = filter.impulse_response(window, FS);

        let peak = reference
            .samples
            .iter()
            .fold(0.0f64, |m, &v| m.max(v.abs()));
        let rms = (impulse
            .samples
            .iter()
            .zip(&reference.samples)
            .map(|(e, r)| (e - r) * (e - r))
            .sum::<f64>()
            / window as f64)
            .sqrt();
        assert!(
            rms / peak < 0.05,
            "peak-normalized RMS error too large: {}",
            rms / peak
        );
    }

    #[test]
    fn test_matched_scaling_pins_windowed_sum() {
        let filter = butterworth_lowpass(4, 10_000.0, FS);
        let excitation = generate(PrbsOrder::Order15, 32767, 1).unwrap();
        let response = filter.filter(&excitation);

        let window = 480;
        let reference = filter.impulse_response(window, FS);
        let impulse = estimator(window)
            .estimate_matched(&excitation, &response, &reference.samples)
            .unwrap();

        let sum_est: f64 = impulse.samples.iter().sum();
        let sum_ref: f64 = reference.samples.iter().sum();
        assert!(
            (sum_est - sum_ref).abs() < 1e-9 * sum_ref.abs().max(1.0),
            "windowed sums differ: {} vs {}",
            sum_est,
            sum_ref
        );
    }

    #[test]
    fn test_raw_and_energy_normalization_differ_by_length() {
        let excitation = generate(PrbsOrder::Order7, 127, 1).unwrap();
        let raw = ImpulseEstimator::new(EstimatorConfig {
            sample_rate: FS,
            window_samples: 16,
            normalization: Normalization::Raw,
        })
        .unwrap()
        .estimate(&excitation, &excitation)
        .unwrap();
        let scaled = estimator(16).estimate(&excitation, &excitation).unwrap();
        for (r, s) in raw.samples.iter().zip(&scaled.samples) {
            assert!((r - s * 127.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_settling_time_window_derivation() {
        let config = EstimatorConfig::with_settling_time(48_000.0, 0.002);
        assert_eq!(config.window_samples, 96);
        let config = EstimatorConfig::with_settling_time(44_100.0, 0.01);
        assert_eq!(config.window_samples, 441);
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = ImpulseEstimator::new(EstimatorConfig {
            sample_rate: FS,
            window_samples: 0,
            normalization: Normalization::default(),
        })
        .unwrap_err();
        assert_eq!(err, SysIdError::InvalidWindow(0));
    }

    #[test]
    fn test_short_response_rejected() {
        let excitation = generate(PrbsOrder::Order7, 127, 1).unwrap();
        let err = estimator(16)
            .estimate(&excitation, &excitation[..100])
            .unwrap_err();
        assert_eq!(
            err,
            SysIdError::InsufficientData {
                needed: 127,
                actual: 100
            }
        );
    }

    #[test]
    fn test_window_beyond_response_rejected() {
        let excitation = generate(PrbsOrder::Order7, 127, 1).unwrap();
        let err = estimator(128).estimate(&excitation, &excitation).unwrap_err();
        assert_eq!(
            err,
            SysIdError::InsufficientData {
                needed: 128,
                actual: 127
            }
        );
    }

    #[test]
    fn test_zero_reference_sum_is_degenerate() {
        let excitation = generate(PrbsOrder::Order7, 127, 1).unwrap();
        let reference = vec![0.0; 16];
        let err = estimator(16)
            .estimate_matched(&excitation, &excitation, &reference)
            .unwrap_err();
        assert!(matches!(err, SysIdError::DegenerateSignal(_)));
    }

    #[test]
    fn test_zero_response_is_degenerate_when_matched() {
        let excitation = generate(PrbsOrder::Order7, 127, 1).unwrap();
        let response = vec![0.0; 127];
        let reference = vec![1.0; 16];
        let err = estimator(16)
            .estimate_matched(&excitation, &response, &reference)
            .unwrap_err();
        assert!(matches!(err, SysIdError::DegenerateSignal(_)));
    }

    #[test]
    fn test_determinism() {
        let excitation = generate(PrbsOrder::Order9, 511, 1).unwrap();
        let a = estimator(48).estimate(&excitation, &excitation).unwrap();
        let b = estimator(48).estimate(&excitation, &excitation).unwrap();
        assert_eq!(a.samples, b.samples);
    }
}
