//! Planned FFT wrapper
//!
//! Thin wrapper around `rustfft` holding pre-planned forward and inverse
//! transforms plus a shared scratch buffer. Sizes are arbitrary (rustfft
//! handles non-powers of two); the correlation fast path always plans
//! powers of two.

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::fmt;
use std::sync::Arc;

/// Pre-planned forward/inverse FFT pair of a fixed size.
pub struct FftProcessor {
    size: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    scratch: Vec<Complex64>,
}

impl fmt::Debug for FftProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftProcessor")
            .field("size", &self.size)
            .finish()
    }
}

impl FftProcessor {
    /// Plan forward and inverse transforms for the given size.
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        Self {
            size,
            forward,
            inverse,
            scratch: vec![Complex64::new(0.0, 0.0); scratch_len],
        }
    }

    /// Transform size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// In-place forward FFT. `buf.len()` must equal the planned size.
    pub fn fft_inplace(&mut self, buf: &mut [Complex64]) {
        debug_assert_eq!(buf.len(), self.size);
        self.forward.process_with_scratch(buf, &mut self.scratch);
    }

    /// In-place inverse FFT with 1/N scaling.
    pub fn ifft_inplace(&mut self, buf: &mut [Complex64]) {
        debug_assert_eq!(buf.len(), self.size);
        self.inverse.process_with_scratch(buf, &mut self.scratch);
        let scale = 1.0 / self.size as f64;
        for v in buf.iter_mut() {
            *v *= scale;
        }
    }

    /// Forward-transform a real signal, zero-padded to the planned size.
    pub fn fft_real(&mut self, input: &[f64]) -> Vec<Complex64> {
        debug_assert!(input.len() <= self.size);
        let mut buf = vec![Complex64::new(0.0, 0.0); self.size];
        for (slot, &x) in buf.iter_mut().zip(input) {
            *slot = Complex64::new(x, 0.0);
        }
        self.fft_inplace(&mut buf);
        buf
    }
}
