//! Rational transfer function
//!
//! Discrete-time transfer function in numerator/denominator coefficient
//! form,
//!
//! ```text
//!        b[0] + b[1] z^-1 + ... + b[M] z^-M
//! H(z) = -----------------------------------
//!        a[0] + a[1] z^-1 + ... + a[K] z^-K
//! ```
//!
//! normalized so `a[0] = 1`. Batch filtering runs the difference equation
//! in Direct Form II Transposed; the analytic impulse response drives a
//! unit impulse through the same recurrence, and the analytic frequency
//! response evaluates H on the unit circle directly.

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::estimator::ImpulseResponse;
use crate::spectrum::FrequencyResponse;
use crate::types::{SysIdError, SysIdResult};

/// A rational discrete-time transfer function.
#[derive(Debug, Clone)]
pub struct TransferFunction {
    /// Numerator coefficients, b[0] first.
    b: Vec<f64>,
    /// Denominator coefficients, normalized so a[0] = 1.
    a: Vec<f64>,
}

impl TransferFunction {
    /// Build from coefficient vectors, normalizing by `a[0]`.
    ///
    /// Fails with `DegenerateSignal` on empty coefficients or a zero
    /// leading denominator coefficient.
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> SysIdResult<Self> {
        if b.is_empty() || a.is_empty() {
            return Err(SysIdError::DegenerateSignal(
                "transfer function needs at least one coefficient on each side",
            ));
        }
        let a0 = a[0];
        if a0.abs() < 1e-300 {
            return Err(SysIdError::DegenerateSignal(
                "leading denominator coefficient is zero",
            ));
        }
        Ok(Self::from_normalized(
            b.iter().map(|&c| c / a0).collect(),
            a.iter().map(|&c| c / a0).collect(),
        ))
    }

    /// Internal constructor for coefficients already normalized to a[0] = 1.
    pub(crate) fn from_normalized(b: Vec<f64>, a: Vec<f64>) -> Self {
        Self { b, a }
    }

    /// Numerator coefficients.
    pub fn numerator(&self) -> &[f64] {
        &self.b
    }

    /// Denominator coefficients (a[0] = 1).
    pub fn denominator(&self) -> &[f64] {
        &self.a
    }

    /// Filter order, max of numerator and denominator degree.
    pub fn order(&self) -> usize {
        self.b.len().max(self.a.len()) - 1
    }

    /// Run a block of samples through the difference equation.
    ///
    /// Direct Form II Transposed with fresh state per call: repeated calls
    /// on the same input produce identical output.
    pub fn filter(&self, input: &[f64]) -> Vec<f64> {
        let n = self.b.len().max(self.a.len());
        let mut b = self.b.clone();
        let mut a = self.a.clone();
        b.resize(n, 0.0);
        a.resize(n, 0.0);

        if n == 1 {
            return input.iter().map(|&x| b[0] * x).collect();
        }

        let mut state = vec![0.0; n - 1];
        let mut output = Vec::with_capacity(input.len());
        for &x in input {
            let y = b[0] * x + state[0];
            for i in 0..n - 2 {
                state[i] = b[i + 1] * x + state[i + 1] - a[i + 1] * y;
            }
            state[n - 2] = b[n - 1] * x - a[n - 1] * y;
            output.push(y);
        }
        output
    }

    /// Analytic impulse response: a unit impulse through the filter.
    pub fn impulse_response(&self, length: usize, sample_rate: f64) -> ImpulseResponse {
        let mut impulse = vec![0.0; length];
        if let Some(first) = impulse.first_mut() {
            *first = 1.0;
        }
        ImpulseResponse::from_samples(self.filter(&impulse), sample_rate)
    }

    /// Complex response at a single frequency.
    pub fn response_at(&self, freq_hz: f64, sample_rate: f64) -> Complex64 {
        let omega = 2.0 * PI * freq_hz / sample_rate;
        let z_inv = Complex64::new(omega.cos(), -omega.sin());
        let num = eval_poly(&self.b, z_inv);
        let den = eval_poly(&self.a, z_inv);
        num / den
    }

    /// Magnitude response in dB at a single frequency.
    pub fn magnitude_db_at(&self, freq_hz: f64, sample_rate: f64) -> f64 {
        20.0 * self.response_at(freq_hz, sample_rate).norm().max(1e-15).log10()
    }

    /// Analytic frequency response on a linear axis from 0 to Nyquist.
    pub fn frequency_response(&self, num_points: usize, sample_rate: f64) -> FrequencyResponse {
        let nyquist = sample_rate / 2.0;
        let step = nyquist / (num_points.saturating_sub(1)).max(1) as f64;
        let frequencies: Vec<f64> = (0..num_points).map(|i| i as f64 * step).collect();
        let response = frequencies
            .iter()
            .map(|&f| self.response_at(f, sample_rate))
            .collect();
        FrequencyResponse {
            frequencies,
            response,
        }
    }
}

/// Evaluate a polynomial in z^-1 by Horner's rule.
fn eval_poly(coeffs: &[f64], z_inv: Complex64) -> Complex64 {
    coeffs
        .iter()
        .rev()
        .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * z_inv + c)
}
