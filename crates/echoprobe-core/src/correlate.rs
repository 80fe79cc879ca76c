//! Cross-correlation engine
//!
//! Linear cross-correlation between real signals of arbitrary lengths, the
//! workhorse behind alignment and impulse-response estimation. Small inputs
//! use a direct lag loop; large inputs switch to fast correlation via FFT
//! (zero-pad to a power of two, multiply by the conjugate spectrum, inverse
//! transform). Both paths agree to numerical precision.
//!
//! Lag layout for `cross_correlate(a, b)`: output index `i` holds
//! `r[k] = sum_n a[n + k] * b[n]` at lag `k = i - (b.len() - 1)`, so the
//! output spans lags `-(b.len() - 1) ..= a.len() - 1` and zero lag sits at
//! index `b.len() - 1`.
//!
//! ## Example
//!
//! ```rust
//! use echoprobe_core::correlate::cross_correlate;
//!
//! let a = vec![0.0, 1.0, 2.0, 1.0];
//! let b = vec![1.0, 2.0, 1.0];
//! let corr = cross_correlate(&a, &b);
//! assert_eq!(corr.len(), 6);
//! // Zero lag at index b.len() - 1 = 2.
//! assert_eq!(corr[2], 0.0 * 1.0 + 1.0 * 2.0 + 2.0 * 1.0);
//! ```

use crate::fft::FftProcessor;

/// Above this product of input lengths the FFT path takes over.
const DIRECT_THRESHOLD: usize = 1 << 16;

/// Full linear cross-correlation of `a` against `b`.
///
/// Output length is `a.len() + b.len() - 1`; see the module docs for the
/// lag layout. Returns an empty vector when either input is empty.
pub fn cross_correlate(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    if a.len().saturating_mul(b.len()) <= DIRECT_THRESHOLD {
        cross_correlate_direct(a, b)
    } else {
        cross_correlate_fft(a, b)
    }
}

/// Valid-mode cross-correlation: only lags where `b` fully overlaps `a`.
///
/// Output index `j` holds `sum_n a[n + j] * b[n]` for
/// `j = 0 ..= a.len() - b.len()`. Returns an empty vector when `a` is
/// shorter than `b`.
pub fn cross_correlate_valid(a: &[f64], b: &[f64]) -> Vec<f64> {
    if b.is_empty() || a.len() < b.len() {
        return Vec::new();
    }
    let full = cross_correlate(a, b);
    let start = b.len() - 1;
    full[start..start + a.len() - b.len() + 1].to_vec()
}

/// Full autocorrelation of a real signal.
pub fn autocorrelate(a: &[f64]) -> Vec<f64> {
    cross_correlate(a, a)
}

fn cross_correlate_direct(a: &[f64], b: &[f64]) -> Vec<f64> {
    let out_len = a.len() + b.len() - 1;
    let mut out = vec![0.0; out_len];
    for (i, slot) in out.iter_mut().enumerate() {
        let lag = i as isize - (b.len() as isize - 1);
        let mut sum = 0.0;
        for (n, &bn) in b.iter().enumerate() {
            let j = n as isize + lag;
            if j >= 0 && (j as usize) < a.len() {
                sum += a[j as usize] * bn;
            }
        }
        *slot = sum;
    }
    out
}

fn cross_correlate_fft(a: &[f64], b: &[f64]) -> Vec<f64> {
    let out_len = a.len() + b.len() - 1;
    let size = out_len.next_power_of_two();
    let mut fft = FftProcessor::new(size);

    let mut fa = fft.fft_real(a);
    let fb = fft.fft_real(b);
    for (va, vb) in fa.iter_mut().zip(&fb) {
        *va *= vb.conj();
    }
    fft.ifft_inplace(&mut fa);

    // Circular correlation parks negative lags at the top of the buffer.
    (0..out_len)
        .map(|i| {
            let lag = i as isize - (b.len() as isize - 1);
            fa[lag.rem_euclid(size as isize) as usize].re
        })
        .collect()
}
