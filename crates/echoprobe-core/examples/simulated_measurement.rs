//! Identify a known lowpass filter from a simulated PRBS measurement.
//!
//! Run with: cargo run --example simulated_measurement -p echoprobe-core

use echoprobe_core::filters::butterworth_lowpass;
use echoprobe_core::prbs::PrbsOrder;
use echoprobe_core::{MeasurementConfig, MeasurementSession, SimulatedSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = MeasurementConfig {
        order: PrbsOrder::Order15,
        ..MeasurementConfig::default()
    };
    let sample_rate = config.sample_rate_hz;
    let session = MeasurementSession::new(config)?;

    let reference = butterworth_lowpass(4, 10_000.0, sample_rate);
    let mut source = SimulatedSource::new(reference.clone());
    let result = session.run_validated(&mut source, &reference)?;

    let est = &result.measurement.impulse.samples;
    let refh = &result.reference_impulse.samples;
    let peak = refh.iter().fold(0.0f64, |m, &v| m.max(v.abs()));
    let rms = (est
        .iter()
        .zip(refh)
        .map(|(e, r)| (e - r) * (e - r))
        .sum::<f64>()
        / refh.len() as f64)
        .sqrt();

    println!("estimated {} impulse response taps", est.len());
    println!("peak-normalized RMS error vs analytic: {:.4}%", 100.0 * rms / peak);

    println!("\n  freq [Hz]   estimated [dB]   analytic [dB]");
    let mags = result.measurement.spectrum.magnitude_db();
    for (f, db) in result
        .measurement
        .spectrum
        .frequencies
        .iter()
        .zip(&mags)
        .step_by(24)
    {
        println!(
            "  {:9.0}   {:14.2}   {:13.2}",
            f,
            db,
            reference.magnitude_db_at(*f, sample_rate)
        );
    }

    Ok(())
}
