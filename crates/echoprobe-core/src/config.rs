//! Measurement configuration
//!
//! One explicit configuration value threaded through every call — sample
//! rate and settling time are parameters here, never ambient globals. The
//! defaults mirror a typical audio measurement: 48 kHz, order-15 PRBS,
//! 10 ms analysis window.

use serde::{Deserialize, Serialize};

use crate::estimator::Normalization;
use crate::prbs::PrbsOrder;
use crate::spectrum::SpectrumConvention;
use crate::types::{SysIdError, SysIdResult};

/// Configuration surface consumed by a measurement session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementConfig {
    /// Sample rate in Hz shared by all time/frequency axes.
    pub sample_rate_hz: f64,
    /// PRBS register width.
    pub order: PrbsOrder,
    /// LFSR seed, nonzero within the register width.
    pub seed: u64,
    /// Number of excitation periods to emit. Repeating the excitation 2-3x
    /// lets alignment pick a correlation peak away from capture edges.
    pub periods: usize,
    /// Analysis window duration in seconds (expected system settling time).
    pub settling_time_s: f64,
    /// Amplitude convention of the estimate.
    pub normalization: Normalization,
    /// Spectrum axis convention.
    pub convention: SpectrumConvention,
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 48_000.0,
            order: PrbsOrder::Order15,
            seed: 1,
            periods: 1,
            settling_time_s: 0.01,
            normalization: Normalization::default(),
            convention: SpectrumConvention::default(),
        }
    }
}

impl MeasurementConfig {
    /// Analysis window in samples, settling time times sample rate.
    pub fn window_samples(&self) -> usize {
        (self.settling_time_s * self.sample_rate_hz).round() as usize
    }

    /// Check every field before a measurement starts.
    pub fn validate(&self) -> SysIdResult<()> {
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(SysIdError::InvalidConfig(format!(
                "sample rate must be positive, got {}",
                self.sample_rate_hz
            )));
        }
        if !(self.settling_time_s.is_finite() && self.settling_time_s > 0.0) {
            return Err(SysIdError::InvalidConfig(format!(
                "settling time must be positive, got {}",
                self.settling_time_s
            )));
        }
        if self.periods == 0 {
            return Err(SysIdError::InvalidConfig(
                "at least one excitation period is required".into(),
            ));
        }
        if self.seed & self.order.mask() == 0 {
            return Err(SysIdError::InvalidSeed);
        }
        if self.window_samples() == 0 {
            return Err(SysIdError::InvalidWindow(0));
        }
        Ok(())
    }

    /// Same config with a different PRBS order.
    pub fn with_order(mut self, order: PrbsOrder) -> Self {
        self.order = order;
        self
    }

    /// Same config with a different repetition count.
    pub fn with_periods(mut self, periods: usize) -> Self {
        self.periods = periods;
        self
    }
}
