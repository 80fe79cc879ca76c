//! Measurement strategy and session pipeline
//!
//! A measurement excites the system under test with a PRBS, captures its
//! response, and runs the fixed forward pipeline: generate, acquire, align
//! when needed, estimate, transform. Where the response comes from is
//! abstracted behind [`ResponseSource`]: a simulated source drives a known
//! reference filter, a hardware source would play and record through an
//! audio device behind the same seam. Which one runs is a configuration
//! choice, not a type hierarchy.
//!
//! Every run allocates fresh vectors and returns a fully materialized
//! result before control returns; nothing is shared across sessions.
//!
//! ## Example
//!
//! ```rust
//! use echoprobe_core::filters::butterworth_lowpass;
//! use echoprobe_core::prbs::PrbsOrder;
//! use echoprobe_core::{MeasurementConfig, MeasurementSession, SimulatedSource};
//!
//! let config = MeasurementConfig {
//!     order: PrbsOrder::Order9,
//!     settling_time_s: 0.002,
//!     ..MeasurementConfig::default()
//! };
//! let session = MeasurementSession::new(config).unwrap();
//! let mut source = SimulatedSource::new(butterworth_lowpass(4, 10_000.0, 48_000.0));
//! let measurement = session.run(&mut source).unwrap();
//! assert_eq!(measurement.impulse.samples.len(), 96);
//! ```

use tracing::{debug, info};

use crate::align::align;
use crate::config::MeasurementConfig;
use crate::estimator::{EstimatorConfig, ImpulseEstimator, ImpulseResponse};
use crate::filters::TransferFunction;
use crate::prbs::PrbsGenerator;
use crate::spectrum::{spectrum, FrequencyResponse};
use crate::types::SysIdResult;

/// Number of points for the analytic frequency response axis.
const REFERENCE_SPECTRUM_POINTS: usize = 512;

/// Produces a response to a given excitation.
///
/// Implementations own the transport: applying a reference filter, or
/// playing and recording through hardware. The pipeline treats both
/// uniformly as "a response vector aligned or alignable to the excitation".
pub trait ResponseSource {
    /// Drive the system under test with the excitation and return the
    /// captured response. The capture may be longer than the excitation
    /// and may be time-shifted relative to it.
    fn acquire(&mut self, excitation: &[f64]) -> SysIdResult<Vec<f64>>;

    /// Whether captures start at unknown latency and need alignment.
    /// Simulated sources return sample-aligned responses.
    fn needs_alignment(&self) -> bool {
        false
    }
}

/// Simulated measurement: the excitation runs through a known filter.
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    filter: TransferFunction,
}

impl SimulatedSource {
    pub fn new(filter: TransferFunction) -> Self {
        Self { filter }
    }

    /// The filter standing in for the system under test.
    pub fn filter(&self) -> &TransferFunction {
        &self.filter
    }
}

impl ResponseSource for SimulatedSource {
    fn acquire(&mut self, excitation: &[f64]) -> SysIdResult<Vec<f64>> {
        Ok(self.filter.filter(excitation))
    }
}

/// Result of one measurement run.
#[derive(Debug, Clone)]
pub struct Measurement {
    /// The full emitted excitation (all periods).
    pub excitation: Vec<f64>,
    /// The raw captured response.
    pub response: Vec<f64>,
    /// Start index of the aligned window in the capture (0 when no
    /// alignment ran).
    pub offset: usize,
    /// Estimated impulse response over the analysis window.
    pub impulse: ImpulseResponse,
    /// Spectrum of the estimate.
    pub spectrum: FrequencyResponse,
}

/// A measurement together with the analytic reference it was validated
/// against.
#[derive(Debug, Clone)]
pub struct ValidatedMeasurement {
    pub measurement: Measurement,
    /// Analytic impulse response of the reference filter over the window.
    pub reference_impulse: ImpulseResponse,
    /// Analytic frequency response of the reference filter up to Nyquist.
    pub reference_spectrum: FrequencyResponse,
}

/// Runs the fixed identification pipeline for one configuration.
#[derive(Debug, Clone)]
pub struct MeasurementSession {
    config: MeasurementConfig,
}

impl MeasurementSession {
    /// Validate the configuration and build a session.
    pub fn new(config: MeasurementConfig) -> SysIdResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The session configuration.
    pub fn config(&self) -> &MeasurementConfig {
        &self.config
    }

    /// Run one measurement: generate, acquire, align if needed, estimate,
    /// transform.
    pub fn run(&self, source: &mut dyn ResponseSource) -> SysIdResult<Measurement> {
        let (excitation, response, window, offset) = self.acquire(source)?;
        let period = self.config.order.period();

        let estimator = self.estimator()?;
        let impulse = estimator.estimate(&excitation[..period], &window)?;
        let spec = spectrum(
            &impulse.samples,
            self.config.sample_rate_hz,
            self.config.convention,
        );
        info!(
            window = impulse.samples.len(),
            bins = spec.len(),
            "impulse response estimated"
        );

        Ok(Measurement {
            excitation,
            response,
            offset,
            impulse,
            spectrum: spec,
        })
    }

    /// Run one measurement in validation mode against a known reference.
    ///
    /// The estimate is amplitude-matched to the reference impulse response
    /// over the analysis window, and the reference's analytic impulse and
    /// frequency responses are returned alongside the measurement.
    pub fn run_validated(
        &self,
        source: &mut dyn ResponseSource,
        reference: &TransferFunction,
    ) -> SysIdResult<ValidatedMeasurement> {
        let (excitation, response, window, offset) = self.acquire(source)?;
        let period = self.config.order.period();
        let fs = self.config.sample_rate_hz;

        let reference_impulse = reference.impulse_response(self.config.window_samples(), fs);
        let estimator = self.estimator()?;
        let impulse =
            estimator.estimate_matched(&excitation[..period], &window, &reference_impulse.samples)?;
        let spec = spectrum(&impulse.samples, fs, self.config.convention);
        let reference_spectrum = reference.frequency_response(REFERENCE_SPECTRUM_POINTS, fs);
        info!(
            window = impulse.samples.len(),
            "impulse response estimated against reference"
        );

        Ok(ValidatedMeasurement {
            measurement: Measurement {
                excitation,
                response,
                offset,
                impulse,
                spectrum: spec,
            },
            reference_impulse,
            reference_spectrum,
        })
    }

    /// Generate the excitation, capture the response and align it.
    ///
    /// Returns `(excitation, raw response, window for estimation, offset)`.
    fn acquire(
        &self,
        source: &mut dyn ResponseSource,
    ) -> SysIdResult<(Vec<f64>, Vec<f64>, Vec<f64>, usize)> {
        let cfg = &self.config;
        let period = cfg.order.period();

        let mut gen = PrbsGenerator::new(cfg.order, cfg.seed)?;
        let excitation = gen.generate(period * cfg.periods);
        debug!(
            order = cfg.order.register_bits(),
            period,
            periods = cfg.periods,
            "generated PRBS excitation"
        );

        let response = source.acquire(&excitation)?;
        debug!(samples = response.len(), "captured response");

        let (window, offset) = if source.needs_alignment() {
            let aligned = align(&excitation[..period], &response)?;
            debug!(offset = aligned.offset, "aligned capture to excitation");
            (aligned.samples, aligned.offset)
        } else {
            (response.clone(), 0)
        };

        Ok((excitation, response, window, offset))
    }

    fn estimator(&self) -> SysIdResult<ImpulseEstimator> {
        ImpulseEstimator::new(EstimatorConfig {
            sample_rate: self.config.sample_rate_hz,
            window_samples: self.config.window_samples(),
            normalization: self.config.normalization,
        })
    }
}
