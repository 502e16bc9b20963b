//! EQ cascade applier
//!
//! Applies a full set of filter descriptors to a magnitude curve. Each enabled
//! filter contributes its per-bin dB response; contributions are summed and
//! added to the base curve, so the order of filters never matters.

use super::biquad::synthesize;
use super::filter::FilterDescriptor;
use super::response::evaluate_magnitude_db;
use crate::error::{Result, TfError};
use crate::measurement::TransferFunction;

/// Summed dB contribution of all enabled filters at each frequency
///
/// Pass filters steeper than 12 dB/octave count their single section
/// `round(slope / 12)` times.
pub fn eq_response_db(
    freqs: &[f64],
    sample_rate: f64,
    descriptors: &[FilterDescriptor],
) -> Result<Vec<f64>> {
    let mut total = vec![0.0; freqs.len()];

    for descriptor in descriptors.iter().filter(|d| d.is_enabled()) {
        let section = synthesize(descriptor, sample_rate)?;
        let sections = descriptor.section_count() as f64;
        let contribution = evaluate_magnitude_db(&[section], sample_rate, freqs);
        for (acc, db) in total.iter_mut().zip(contribution) {
            *acc += db * sections;
        }
    }

    Ok(total)
}

/// Apply an EQ to a base magnitude curve
pub fn apply_eq(
    base_mag_db: &[f64],
    freqs: &[f64],
    sample_rate: f64,
    descriptors: &[FilterDescriptor],
) -> Result<Vec<f64>> {
    if base_mag_db.len() != freqs.len() {
        return Err(TfError::LengthMismatch {
            what: "base magnitude curve",
            expected: freqs.len(),
            actual: base_mag_db.len(),
        });
    }

    let eq = eq_response_db(freqs, sample_rate, descriptors)?;
    tracing::debug!(
        filters = descriptors.len(),
        enabled = descriptors.iter().filter(|d| d.is_enabled()).count(),
        bins = freqs.len(),
        "applied EQ cascade"
    );

    Ok(base_mag_db.iter().zip(eq).map(|(base, db)| base + db).collect())
}

/// Apply an EQ to a measurement's magnitude
///
/// Phase and coherence are carried over untouched; the impulse response no
/// longer matches the curve and is dropped. Every series must match the grid.
pub fn apply_eq_to_measurement(
    measurement: &TransferFunction,
    sample_rate: f64,
    descriptors: &[FilterDescriptor],
) -> Result<TransferFunction> {
    measurement.validate()?;
    let mag_db = apply_eq(&measurement.mag_db, &measurement.freqs, sample_rate, descriptors)?;
    Ok(TransferFunction {
        freqs: measurement.freqs.clone(),
        mag_db,
        phase_deg: measurement.phase_deg.clone(),
        coherence: measurement.coherence.clone(),
        impulse_response: Vec::new(),
    })
}
