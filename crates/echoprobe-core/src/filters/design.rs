//! Classical lowpass designs
//!
//! Butterworth and Chebyshev Type I lowpass prototypes, digitized by the
//! bilinear transform and expanded into a single rational transfer
//! function. Each pole section is normalized to unity DC gain, so the
//! designs are unity-gain at DC (an even-order Chebyshev ripples upward
//! from there by up to its ripple figure).

use num_complex::Complex64;
use std::f64::consts::PI;

use super::transfer::TransferFunction;

/// Design a Butterworth lowpass filter.
///
/// Maximally flat passband, -3 dB at the cutoff, monotonic rolloff.
///
/// # Panics
/// On `order` outside 1..=10 or a cutoff outside (0, sample_rate/2).
pub fn butterworth_lowpass(order: usize, cutoff_hz: f64, sample_rate: f64) -> TransferFunction {
    assert!(order >= 1 && order <= 10, "order must be 1-10");
    assert!(
        cutoff_hz > 0.0 && cutoff_hz < sample_rate / 2.0,
        "cutoff must lie below Nyquist"
    );
    let poles = butterworth_poles(order);
    assemble(&poles, prewarp(cutoff_hz, sample_rate), sample_rate)
}

/// Design a Chebyshev Type I lowpass filter.
///
/// Equiripple passband (`ripple_db`, typically 0.5 to 3), steeper rolloff
/// than Butterworth at the same order.
///
/// # Panics
/// On `order` outside 1..=10, non-positive ripple, or a cutoff outside
/// (0, sample_rate/2).
pub fn chebyshev1_lowpass(
    order: usize,
    ripple_db: f64,
    cutoff_hz: f64,
    sample_rate: f64,
) -> TransferFunction {
    assert!(order >= 1 && order <= 10, "order must be 1-10");
    assert!(ripple_db > 0.0, "ripple must be positive");
    assert!(
        cutoff_hz > 0.0 && cutoff_hz < sample_rate / 2.0,
        "cutoff must lie below Nyquist"
    );
    let poles = chebyshev1_poles(order, ripple_db);
    assemble(&poles, prewarp(cutoff_hz, sample_rate), sample_rate)
}

/// Pre-warp a cutoff frequency for the bilinear transform.
fn prewarp(freq_hz: f64, sample_rate: f64) -> f64 {
    2.0 * sample_rate * (PI * freq_hz / sample_rate).tan()
}

/// Butterworth analog prototype poles on the unit circle.
fn butterworth_poles(order: usize) -> Vec<Complex64> {
    (0..order)
        .map(|k| {
            let theta = PI * (2 * k + order + 1) as f64 / (2 * order) as f64;
            Complex64::new(theta.cos(), theta.sin())
        })
        .collect()
}

/// Chebyshev Type I analog prototype poles on an ellipse.
fn chebyshev1_poles(order: usize, ripple_db: f64) -> Vec<Complex64> {
    let epsilon = (10.0f64.powf(ripple_db / 10.0) - 1.0).sqrt();
    let a = (1.0 / epsilon + (1.0 / (epsilon * epsilon) + 1.0).sqrt()).ln() / order as f64;
    (0..order)
        .map(|k| {
            let theta = PI * (2 * k + 1) as f64 / (2 * order) as f64;
            Complex64::new(-a.sinh() * theta.sin(), a.cosh() * theta.cos())
        })
        .collect()
}

/// Digitize the prototype poles at cutoff `wc` and expand the sections
/// into one rational polynomial pair.
///
/// Complex poles are processed once per conjugate pair (upper-half-plane
/// representative), real poles become first-order sections.
fn assemble(poles: &[Complex64], wc: f64, sample_rate: f64) -> TransferFunction {
    let k = 2.0 * sample_rate;
    let mut b = vec![1.0];
    let mut a = vec![1.0];

    for &pole in poles {
        if pole.im > 1e-9 {
            let (sb, sa) = second_order_section(pole * wc, k);
            b = poly_mul(&b, &sb);
            a = poly_mul(&a, &sa);
        } else if pole.im.abs() <= 1e-9 {
            let (sb, sa) = first_order_section(pole.re * wc, k);
            b = poly_mul(&b, &sb);
            a = poly_mul(&a, &sa);
        }
        // Lower-half poles are the conjugates of sections already emitted.
    }

    TransferFunction::from_normalized(b, a)
}

/// Bilinear transform of H(s) = -p / (s - p) for a real pole p < 0.
fn first_order_section(p: f64, k: f64) -> (Vec<f64>, Vec<f64>) {
    let alpha = k - p;
    let beta = k + p;
    (vec![-p / alpha, -p / alpha], vec![1.0, -beta / alpha])
}

/// Bilinear transform of H(s) = |p|^2 / ((s - p)(s - p*)) for a complex
/// pole pair, normalized to unity DC gain.
fn second_order_section(p: Complex64, k: f64) -> (Vec<f64>, Vec<f64>) {
    let mag_sq = p.norm_sqr();
    let k2 = k * k;
    let d = k2 - 2.0 * k * p.re + mag_sq;
    (
        vec![mag_sq / d, 2.0 * mag_sq / d, mag_sq / d],
        vec![
            1.0,
            2.0 * (mag_sq - k2) / d,
            (k2 + 2.0 * k * p.re + mag_sq) / d,
        ],
    )
}

fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &ai) in a.iter().enumerate() {
        for (j, &bj) in b.iter().enumerate() {
            out[i + j] += ai * bj;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const FS: f64 = 48_000.0;

    fn decays(tf: &TransferFunction) -> bool {
        let h = tf.impulse_response(2048, FS);
        h.samples.iter().rev().take(16).all(|v| v.abs() < 1e-8)
    }

    #[test]
    fn test_butterworth_coefficient_count() {
        let tf = butterworth_lowpass(4, 10_000.0, FS);
        assert_eq!(tf.numerator().len(), 5);
        assert_eq!(tf.denominator().len(), 5);
        assert_eq!(tf.order(), 4);
    }

    #[test]
    fn test_odd_order_includes_real_pole() {
        let tf = butterworth_lowpass(3, 5_000.0, FS);
        assert_eq!(tf.order(), 3);
        assert!(decays(&tf));
    }

    #[test]
    fn test_butterworth_dc_gain_is_unity() {
        for order in 1..=8 {
            let tf = butterworth_lowpass(order, 10_000.0, FS);
            let dc = tf.response_at(0.0, FS).norm();
            assert_relative_eq!(dc, 1.0, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_butterworth_cutoff_is_3db() {
        let tf = butterworth_lowpass(4, 10_000.0, FS);
        let db = tf.magnitude_db_at(10_000.0, FS);
        assert!((db + 3.01).abs() < 0.1, "cutoff sits at {} dB", db);
    }

    #[test]
    fn test_butterworth_rolloff() {
        let tf = butterworth_lowpass(4, 10_000.0, FS);
        // 4th order: ~24 dB/octave past the cutoff.
        let db = tf.magnitude_db_at(20_000.0, FS);
        assert!(db < -20.0, "stopband too shallow: {} dB", db);
        assert!(decays(&tf));
    }

    #[test]
    fn test_chebyshev_ripple_stays_bounded() {
        let ripple = 1.0;
        let tf = chebyshev1_lowpass(4, ripple, 10_000.0, FS);
        assert!((tf.response_at(0.0, FS).norm() - 1.0).abs() < 1e-9);
        for i in 0..100 {
            let f = 10_000.0 * i as f64 / 100.0;
            let db = tf.magnitude_db_at(f, FS);
            assert!(
                db > -0.2 && db < ripple + 0.2,
                "passband at {} Hz out of ripple bounds: {} dB",
                f,
                db
            );
        }
    }

    #[test]
    fn test_chebyshev_steeper_than_butterworth() {
        let butter = butterworth_lowpass(4, 10_000.0, FS);
        let cheby = chebyshev1_lowpass(4, 1.0, 10_000.0, FS);
        let fb = butter.magnitude_db_at(20_000.0, FS);
        let fc = cheby.magnitude_db_at(20_000.0, FS);
        assert!(fc < fb, "Chebyshev should roll off faster: {} vs {}", fc, fb);
    }

    #[test]
    fn test_chebyshev_stability() {
        for order in 1..=8 {
            let tf = chebyshev1_lowpass(order, 1.0, 8_000.0, FS);
            assert!(decays(&tf), "order {} does not decay", order);
        }
    }

    #[test]
    fn test_impulse_sum_approaches_dc_gain() {
        let tf = butterworth_lowpass(4, 10_000.0, FS);
        let sum: f64 = tf.impulse_response(2048, FS).samples.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6, "impulse sum {} != DC gain", sum);
    }
}
