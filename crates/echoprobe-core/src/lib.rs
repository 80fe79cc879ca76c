//! # EchoProbe Core
//!
//! Blind identification of a linear time-invariant audio path by PRBS
//! excitation and cross-correlation.
//!
//! ## Overview
//!
//! An unknown system — a filter, a speaker/microphone loop, a simulated
//! reference — is driven with a maximal-length pseudo-random binary
//! sequence. Because that excitation is nearly white, the cross-correlation
//! between excitation and response is, up to scale, the system's impulse
//! response; an FFT of the windowed estimate yields the frequency response.
//!
//! ## Signal Flow
//!
//! ```text
//! PRBS ──► system under test ──► response ──► align ──► correlate ──► FFT
//!  (LFSR)   (filter or hardware)              (live       (impulse      (frequency
//!                                             captures)    response)     response)
//! ```
//!
//! The crate covers the computational pipeline: PRBS generation, alignment,
//! correlation estimation, spectral derivation, and the analytic reference
//! filters used to validate the estimate. Rendering, WAV export and audio
//! device I/O live behind the [`measurement::ResponseSource`] seam and are
//! not part of this crate.
//!
//! ## Example
//!
//! ```rust
//! use echoprobe_core::filters::butterworth_lowpass;
//! use echoprobe_core::prbs::PrbsOrder;
//! use echoprobe_core::{MeasurementConfig, MeasurementSession, SimulatedSource};
//!
//! // Identify a known 10 kHz lowpass from a simulated loopback.
//! let config = MeasurementConfig {
//!     order: PrbsOrder::Order9,
//!     periods: 2,
//!     settling_time_s: 0.002,
//!     ..MeasurementConfig::default()
//! };
//! let session = MeasurementSession::new(config).unwrap();
//! let reference = butterworth_lowpass(4, 10_000.0, 48_000.0);
//! let mut source = SimulatedSource::new(reference.clone());
//!
//! let result = session.run_validated(&mut source, &reference).unwrap();
//! assert_eq!(result.measurement.impulse.samples.len(), 96);
//! assert_eq!(result.reference_impulse.samples.len(), 96);
//! ```

pub mod align;
pub mod config;
pub mod correlate;
pub mod estimator;
pub mod fft;
pub mod filters;
pub mod measurement;
pub mod prbs;
pub mod spectrum;
pub mod types;

pub use align::{align as align_response, Alignment};
pub use config::MeasurementConfig;
pub use estimator::{EstimatorConfig, ImpulseEstimator, ImpulseResponse, Normalization};
pub use measurement::{
    Measurement, MeasurementSession, ResponseSource, SimulatedSource, ValidatedMeasurement,
};
pub use prbs::{PrbsGenerator, PrbsOrder};
pub use spectrum::{FrequencyResponse, SpectrumConvention};
pub use types::{Sample, SysIdError, SysIdResult};
