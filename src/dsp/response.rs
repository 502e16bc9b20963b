//! Analytic frequency response of second-order sections
//!
//! H(e^jw) is evaluated directly from the coefficients, so any frequency grid
//! works, including the non-uniform grids of measurement sweeps.

use num_complex::Complex64;
use std::f64::consts::PI;

use super::biquad::SecondOrderSection;
use super::complex::{linear_to_db, MIN_DENOMINATOR_ENERGY};

/// Numerator and denominator of one section at normalized frequency `w`
fn polynomials(section: &SecondOrderSection, w: f64) -> (Complex64, Complex64) {
    let (sin_w, cos_w) = w.sin_cos();
    let (sin_2w, cos_2w) = (2.0 * w).sin_cos();

    let num = Complex64::new(
        section.b0 + section.b1 * cos_w + section.b2 * cos_2w,
        -(section.b1 * sin_w + section.b2 * sin_2w),
    );
    let den = Complex64::new(
        section.a0 + section.a1 * cos_w + section.a2 * cos_2w,
        -(section.a1 * sin_w + section.a2 * sin_2w),
    );
    (num, den)
}

#[inline]
fn normalized_frequency(freq: f64, sample_rate: f64) -> f64 {
    2.0 * PI * freq / sample_rate
}

/// Magnitude of one section in dB at `freq`
pub fn section_magnitude_db(section: &SecondOrderSection, sample_rate: f64, freq: f64) -> f64 {
    let (num, den) = polynomials(section, normalized_frequency(freq, sample_rate));
    let ratio = num.norm_sqr() / den.norm_sqr().max(MIN_DENOMINATOR_ENERGY);
    linear_to_db(ratio.sqrt())
}

/// Complex response of one section at `freq`
pub fn section_response(section: &SecondOrderSection, sample_rate: f64, freq: f64) -> Complex64 {
    let (num, den) = polynomials(section, normalized_frequency(freq, sample_rate));
    if den.norm_sqr() < MIN_DENOMINATOR_ENERGY {
        return Complex64::new(0.0, 0.0);
    }
    num / den
}

/// Magnitude of a cascade in dB at each query frequency
///
/// Per-section dB values are summed, so an empty cascade is 0 dB everywhere.
pub fn evaluate_magnitude_db(
    sections: &[SecondOrderSection],
    sample_rate: f64,
    freqs: &[f64],
) -> Vec<f64> {
    freqs
        .iter()
        .map(|&f| {
            sections
                .iter()
                .map(|section| section_magnitude_db(section, sample_rate, f))
                .sum()
        })
        .collect()
}

/// Complex response of a cascade at each query frequency
pub fn evaluate_complex(
    sections: &[SecondOrderSection],
    sample_rate: f64,
    freqs: &[f64],
) -> Vec<Complex64> {
    freqs
        .iter()
        .map(|&f| {
            sections
                .iter()
                .fold(Complex64::new(1.0, 0.0), |acc, section| {
                    acc * section_response(section, sample_rate, f)
                })
        })
        .collect()
}

/// Phase of a cascade in degrees, wrapped into `(-180, 180]`
pub fn evaluate_phase_deg(
    sections: &[SecondOrderSection],
    sample_rate: f64,
    freqs: &[f64],
) -> Vec<f64> {
    evaluate_complex(sections, sample_rate, freqs)
        .into_iter()
        .map(|h| super::complex::complex_to_polar_db(h).1)
        .map(super::complex::wrap_phase_deg)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::filter::{FilterType, GenericFilter};
    use approx::assert_relative_eq;

    fn design(filter_type: FilterType, freq: f64, gain_db: f64, q: f64) -> SecondOrderSection {
        SecondOrderSection::design(&GenericFilter::new(filter_type, freq, gain_db, q), 48000.0)
    }

    #[test]
    fn test_peak_gain_at_center() {
        let section = design(FilterType::Peaking, 1000.0, 6.0, 1.0);
        let db = evaluate_magnitude_db(&[section], 48000.0, &[1000.0]);
        assert!((db[0] - 6.0).abs() < 0.01, "expected +6 dB, got {}", db[0]);
    }

    #[test]
    fn test_empty_cascade_is_flat() {
        let freqs = [20.0, 100.0, 1000.0, 10_000.0, 20_000.0];
        let db = evaluate_magnitude_db(&[], 48000.0, &freqs);
        assert_eq!(db, vec![0.0; freqs.len()]);
    }

    #[test]
    fn test_identity_section_is_flat() {
        let freqs = [20.0, 1000.0, 23_999.0];
        for db in evaluate_magnitude_db(&[SecondOrderSection::identity()], 48000.0, &freqs) {
            assert_relative_eq!(db, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_butterworth_is_minus_3db_at_cutoff() {
        let lp = design(FilterType::LowPass, 1000.0, 0.0, std::f64::consts::FRAC_1_SQRT_2);
        let hp = design(FilterType::HighPass, 1000.0, 0.0, std::f64::consts::FRAC_1_SQRT_2);
        let lp_db = evaluate_magnitude_db(&[lp], 48000.0, &[1000.0])[0];
        let hp_db = evaluate_magnitude_db(&[hp], 48000.0, &[1000.0])[0];
        assert_relative_eq!(lp_db, -3.0103, epsilon = 0.01);
        assert_relative_eq!(hp_db, -3.0103, epsilon = 0.01);
    }

    #[test]
    fn test_cascade_sums_in_db() {
        let a = design(FilterType::Peaking, 500.0, 4.0, 1.0);
        let b = design(FilterType::HighShelf, 3000.0, -2.0, 0.7);
        let freqs = [100.0, 500.0, 2000.0, 8000.0];
        let a_db = evaluate_magnitude_db(&[a], 48000.0, &freqs);
        let b_db = evaluate_magnitude_db(&[b], 48000.0, &freqs);
        let both = evaluate_magnitude_db(&[a, b], 48000.0, &freqs);
        for i in 0..freqs.len() {
            assert_relative_eq!(both[i], a_db[i] + b_db[i], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_complex_agrees_with_magnitude() {
        let sections = [
            design(FilterType::Peaking, 800.0, -5.0, 2.0),
            design(FilterType::LowShelf, 120.0, 3.0, 0.7),
        ];
        let freqs = [50.0, 800.0, 5000.0];
        let db = evaluate_magnitude_db(&sections, 48000.0, &freqs);
        let h = evaluate_complex(&sections, 48000.0, &freqs);
        for i in 0..freqs.len() {
            assert_relative_eq!(20.0 * h[i].norm().log10(), db[i], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_highpass_zero_at_dc_is_clamped() {
        let hp = design(FilterType::HighPass, 1000.0, 0.0, 0.707);
        let db = evaluate_magnitude_db(&[hp], 48000.0, &[0.0])[0];
        assert!(db.is_finite());
        assert!(db <= -200.0);
    }

    #[test]
    fn test_phase_is_wrapped() {
        let sections = [design(FilterType::HighPass, 200.0, 0.0, 0.707); 4];
        let freqs: Vec<f64> = (1..200).map(|i| i as f64 * 10.0).collect();
        for p in evaluate_phase_deg(&sections, 48000.0, &freqs) {
            assert!(p > -180.0 && p <= 180.0);
        }
    }
}
