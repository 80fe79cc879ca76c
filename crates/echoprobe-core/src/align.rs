//! Excitation/response alignment
//!
//! Live captures start at arbitrary analog and system latency, so the
//! excitation period sits somewhere unknown inside the recorded buffer.
//! Valid-mode cross-correlation against one excitation period finds the
//! best-fit start index; the magnitude peak is used so inverted captures
//! align too.
//!
//! ## Example
//!
//! ```rust
//! use echoprobe_core::align::align;
//!
//! let excitation = vec![1.0, -1.0, 1.0, 1.0];
//! let mut response = vec![0.0; 10];
//! response[3..7].copy_from_slice(&excitation);
//! let aligned = align(&excitation, &response).unwrap();
//! assert_eq!(aligned.offset, 3);
//! assert_eq!(aligned.samples, excitation);
//! ```

use crate::correlate::cross_correlate_valid;
use crate::types::{SysIdError, SysIdResult};

/// One excitation-length window of the capture plus where it was found.
#[derive(Debug, Clone)]
pub struct Alignment {
    /// `response[offset .. offset + excitation.len()]`.
    pub samples: Vec<f64>,
    /// Start index of the best-aligned excitation period in the capture.
    pub offset: usize,
}

/// Locate one full excitation period inside a longer capture.
///
/// Correlation is restricted to lags where the whole excitation fits inside
/// the response, so capture edges never produce zero-padding artifacts.
/// Fails with `InsufficientCaptureLength` when the capture is shorter than
/// the excitation.
pub fn align(excitation: &[f64], response: &[f64]) -> SysIdResult<Alignment> {
    if excitation.is_empty() {
        return Err(SysIdError::DegenerateSignal("empty excitation"));
    }
    if response.len() < excitation.len() {
        return Err(SysIdError::InsufficientCaptureLength {
            needed: excitation.len(),
            actual: response.len(),
        });
    }

    let corr = cross_correlate_valid(response, excitation);
    let offset = corr
        .iter()
        .enumerate()
        .max_by(|(_, x), (_, y)| x.abs().partial_cmp(&y.abs()).unwrap())
        .map(|(i, _)| i)
        .unwrap_or(0);

    Ok(Alignment {
        samples: response[offset..offset + excitation.len()].to_vec(),
        offset,
    })
}
