//! Second-order section synthesis (RBJ cookbook)
//!
//! Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (a0 + a1*z^-1 + a2*z^-2)
//! Reference: https://www.w3.org/2011/audio/audio-eq-cookbook.html

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::filter::{FilterDescriptor, FilterType, GenericFilter};
use super::presets::map_preset;
use crate::error::Result;

/// Smallest Q accepted by the formulas
pub const MIN_Q: f64 = 1e-6;

/// Shelf slope used when the caller does not supply one
pub const DEFAULT_SHELF_SLOPE: f64 = 1.0;

/// Biquad coefficients, normalized so `a0 == 1`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecondOrderSection {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
}

impl SecondOrderSection {
    /// Unity gain, no filtering
    pub const fn identity() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a0: 1.0,
            a1: 0.0,
            a2: 0.0,
        }
    }

    /// Divide raw coefficients by the raw `a0`
    pub fn from_raw(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a0: 1.0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    /// Calculate coefficients for a generic filter at `sample_rate`
    ///
    /// Inputs are clamped rather than rejected. Frequency and sample rate must
    /// be positive.
    pub fn design(filter: &GenericFilter, sample_rate: f64) -> Self {
        let q = filter.q.max(MIN_Q);
        let w0 = 2.0 * PI * filter.frequency / sample_rate;
        let cos_w0 = w0.cos();
        let sin_w0 = w0.sin();
        let a = 10.0_f64.powf(filter.gain_db / 40.0);

        let (b0, b1, b2, a0, a1, a2) = match filter.filter_type {
            FilterType::Peaking => {
                let alpha = sin_w0 / (2.0 * q);
                (
                    1.0 + alpha * a,
                    -2.0 * cos_w0,
                    1.0 - alpha * a,
                    1.0 + alpha / a,
                    -2.0 * cos_w0,
                    1.0 - alpha / a,
                )
            }
            FilterType::LowShelf => {
                let two_sqrt_a_alpha = 2.0 * a.sqrt() * shelf_alpha(sin_w0, a, filter.shelf_slope);
                (
                    a * ((a + 1.0) - (a - 1.0) * cos_w0 + two_sqrt_a_alpha),
                    2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w0),
                    a * ((a + 1.0) - (a - 1.0) * cos_w0 - two_sqrt_a_alpha),
                    (a + 1.0) + (a - 1.0) * cos_w0 + two_sqrt_a_alpha,
                    -2.0 * ((a - 1.0) + (a + 1.0) * cos_w0),
                    (a + 1.0) + (a - 1.0) * cos_w0 - two_sqrt_a_alpha,
                )
            }
            FilterType::HighShelf => {
                let two_sqrt_a_alpha = 2.0 * a.sqrt() * shelf_alpha(sin_w0, a, filter.shelf_slope);
                (
                    a * ((a + 1.0) + (a - 1.0) * cos_w0 + two_sqrt_a_alpha),
                    -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_w0),
                    a * ((a + 1.0) + (a - 1.0) * cos_w0 - two_sqrt_a_alpha),
                    (a + 1.0) - (a - 1.0) * cos_w0 + two_sqrt_a_alpha,
                    2.0 * ((a - 1.0) - (a + 1.0) * cos_w0),
                    (a + 1.0) - (a - 1.0) * cos_w0 - two_sqrt_a_alpha,
                )
            }
            FilterType::LowPass => {
                let alpha = sin_w0 / (2.0 * q);
                (
                    (1.0 - cos_w0) / 2.0,
                    1.0 - cos_w0,
                    (1.0 - cos_w0) / 2.0,
                    1.0 + alpha,
                    -2.0 * cos_w0,
                    1.0 - alpha,
                )
            }
            FilterType::HighPass => {
                let alpha = sin_w0 / (2.0 * q);
                (
                    (1.0 + cos_w0) / 2.0,
                    -(1.0 + cos_w0),
                    (1.0 + cos_w0) / 2.0,
                    1.0 + alpha,
                    -2.0 * cos_w0,
                    1.0 - alpha,
                )
            }
        };

        Self::from_raw(b0, b1, b2, a0, a1, a2)
    }
}

/// Shelf bandwidth term: (sin w0 / 2) * sqrt((A + 1/A)(1/S - 1) + 2)
fn shelf_alpha(sin_w0: f64, a: f64, shelf_slope: Option<f64>) -> f64 {
    let s = shelf_slope.unwrap_or(DEFAULT_SHELF_SLOPE).max(MIN_Q);
    // Too steep a slope drives the radicand negative; clamp at zero bandwidth.
    let radicand = ((a + 1.0 / a) * (1.0 / s - 1.0) + 2.0).max(0.0);
    sin_w0 / 2.0 * radicand.sqrt()
}

/// Synthesize one section for any descriptor, mapping presets first
pub fn synthesize(descriptor: &FilterDescriptor, sample_rate: f64) -> Result<SecondOrderSection> {
    let generic = match descriptor {
        FilterDescriptor::Parametric(band) => band.to_generic(),
        FilterDescriptor::Preset(preset) => map_preset(preset)?,
    };
    Ok(SecondOrderSection::design(&generic, sample_rate))
}
