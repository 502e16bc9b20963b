//! dB/phase <-> complex conversions
//!
//! Every numeric floor used by the evaluator and the combiner lives here so
//! the clamps stay consistent between the two.

use num_complex::Complex64;

/// Magnitudes at or below this level are treated as exact zero
pub const MIN_MAGNITUDE_DB: f64 = -200.0;

/// Squared magnitude below which a complex value maps to [`MIN_MAGNITUDE_DB`]
pub const MIN_POWER: f64 = 1e-24;

/// Floor applied to linear magnitude before taking a logarithm
pub const MIN_LINEAR_MAGNITUDE: f64 = 1e-12;

/// Floor applied to a transfer-function denominator's energy
pub const MIN_DENOMINATOR_ENERGY: f64 = 1e-30;

/// Convert decibels to linear amplitude
#[inline]
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Convert linear amplitude to decibels, never returning `-inf`
#[inline]
pub fn linear_to_db(linear: f64) -> f64 {
    20.0 * linear.max(MIN_LINEAR_MAGNITUDE).log10()
}

/// Polar (dB, degrees) to rectangular
///
/// Anything below [`MIN_MAGNITUDE_DB`] becomes exactly `0 + 0i`.
pub fn polar_db_to_complex(mag_db: f64, phase_deg: f64) -> Complex64 {
    if mag_db < MIN_MAGNITUDE_DB {
        return Complex64::new(0.0, 0.0);
    }
    Complex64::from_polar(db_to_linear(mag_db), phase_deg.to_radians())
}

/// Rectangular to polar (dB, degrees)
///
/// Near-zero values map to `(-200 dB, 0°)`; a non-finite angle is read as 0 rad.
/// The phase is whatever `atan2` yields, i.e. within `[-180, 180]`.
pub fn complex_to_polar_db(value: Complex64) -> (f64, f64) {
    let power = value.norm_sqr();
    if !(power >= MIN_POWER) {
        return (MIN_MAGNITUDE_DB, 0.0);
    }
    let mag_db = 10.0 * power.log10();
    let mut phase_rad = value.im.atan2(value.re);
    if !phase_rad.is_finite() {
        phase_rad = 0.0;
    }
    (mag_db, phase_rad.to_degrees())
}

/// Wrap a phase into `(-180, 180]`
///
/// Non-finite input wraps to 0.
#[inline]
pub fn wrap_phase_deg(phase_deg: f64) -> f64 {
    if !phase_deg.is_finite() {
        return 0.0;
    }
    let wrapped = 180.0 - (180.0 - phase_deg).rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative remainders
    if wrapped <= -180.0 {
        180.0
    } else {
        wrapped
    }
}

/// Remove ±360° discontinuities so consecutive values differ by at most 180°
pub fn unwrap_phase_deg(phase_deg: &[f64]) -> Vec<f64> {
    let mut unwrapped = Vec::with_capacity(phase_deg.len());
    let mut prev = match phase_deg.first() {
        Some(&first) => first,
        None => return unwrapped,
    };
    unwrapped.push(prev);

    for &raw in &phase_deg[1..] {
        // Shift by whole turns until we land within half a turn of the previous bin.
        let diff = raw - prev;
        let turns = ((diff.abs() - 180.0) / 360.0).ceil().max(0.0);
        let next = if diff > 180.0 {
            raw - 360.0 * turns
        } else if diff < -180.0 {
            raw + 360.0 * turns
        } else {
            raw
        };
        unwrapped.push(next);
        prev = next;
    }

    unwrapped
}

/// Wrap every value of a phase series into `(-180, 180]`
pub fn wrap_phase_series(phase_deg: &[f64]) -> Vec<f64> {
    phase_deg.iter().map(|&p| wrap_phase_deg(p)).collect()
}
