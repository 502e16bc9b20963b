//! Transfer-function combiner
//!
//! Sources are phase-unwrapped, converted to complex per bin, combined, and
//! converted back. Averaging uses a coherence-weighted geometric mean for
//! magnitude and a coherence-weighted arithmetic mean for (unwrapped) phase.

use num_complex::Complex64;

use super::math_trace::MathOperation;
use super::{check_grid, TransferFunction};
use crate::config::CombineOptions;
use crate::dsp::complex::{
    complex_to_polar_db, polar_db_to_complex, unwrap_phase_deg, wrap_phase_deg,
};
use crate::error::CombineError;

/// A combination result that is always usable
///
/// On failure `measurement` is [`TransferFunction::empty`] and `error` says why.
#[derive(Debug, Clone, PartialEq)]
pub struct CombineOutcome {
    pub measurement: TransferFunction,
    pub error: Option<CombineError>,
}

impl CombineOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<TransferFunction, CombineError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.measurement),
        }
    }
}

impl From<Result<TransferFunction, CombineError>> for CombineOutcome {
    fn from(result: Result<TransferFunction, CombineError>) -> Self {
        match result {
            Ok(measurement) => CombineOutcome {
                measurement,
                error: None,
            },
            Err(err) => {
                tracing::warn!(code = err.error_code(), "math trace produced no result: {}", err);
                CombineOutcome {
                    measurement: TransferFunction::empty(),
                    error: Some(err),
                }
            }
        }
    }
}

/// Combine measurements with default options
pub fn combine(
    sources: &[TransferFunction],
    operation: MathOperation,
) -> Result<TransferFunction, CombineError> {
    combine_with(sources, operation, &CombineOptions::default())
}

/// Combine measurements, reporting failure as an empty measurement
pub fn combine_or_empty(sources: &[TransferFunction], operation: MathOperation) -> CombineOutcome {
    combine(sources, operation).into()
}

/// Source refs are accepted so math traces can combine stored measurements
/// without cloning them.
pub(crate) fn combine_refs(
    sources: &[&TransferFunction],
    operation: MathOperation,
    options: &CombineOptions,
) -> Result<TransferFunction, CombineError> {
    operation.check_arity(sources.len())?;
    options
        .validate()
        .map_err(|err| CombineError::InvalidOptions {
            reason: err.to_string(),
        })?;

    let reference = sources[0];
    for (index, source) in sources.iter().enumerate() {
        source.validate_as(index)?;
        if index > 0 {
            check_grid(&reference.freqs, &source.freqs, index, options.grid_tolerance_hz)?;
        }
    }
    // An empty result is reserved for failures
    if reference.is_empty() {
        return Err(CombineError::EmptyGrid);
    }

    if sources.len() == 1 {
        return Ok(copy_of(reference));
    }

    let unwrapped: Vec<Vec<f64>> = sources.iter().map(|s| unwrap_phase_deg(&s.phase_deg)).collect();
    let bins = reference.freqs.len();
    let mut mag_db = Vec::with_capacity(bins);
    let mut phase_deg = Vec::with_capacity(bins);
    let mut coherence = Vec::with_capacity(bins);

    for bin in 0..bins {
        let (value, coh) = match operation {
            MathOperation::Subtract => {
                let a = polar_db_to_complex(sources[0].mag_db[bin], unwrapped[0][bin]);
                let b = polar_db_to_complex(sources[1].mag_db[bin], unwrapped[1][bin]);
                (a - b, sources[0].coherence[bin].min(sources[1].coherence[bin]))
            }
            MathOperation::Sum => {
                let total = sources
                    .iter()
                    .zip(&unwrapped)
                    .map(|(s, phase)| polar_db_to_complex(s.mag_db[bin], phase[bin]))
                    .sum::<Complex64>();
                let coh = sources
                    .iter()
                    .map(|s| s.coherence[bin])
                    .fold(f64::INFINITY, f64::min);
                (total, coh)
            }
            MathOperation::Average => {
                average_bin(sources, &unwrapped, bin, options.coherence_weight_floor)
            }
        };

        let (mag, phase) = complex_to_polar_db(value);
        mag_db.push(mag);
        phase_deg.push(phase);
        coherence.push(coh);
    }

    let phase_deg = phase_deg.into_iter().map(wrap_phase_deg).collect();

    tracing::debug!(
        operation = operation.name(),
        sources = sources.len(),
        bins,
        "combined transfer functions"
    );

    Ok(TransferFunction::new(reference.freqs.clone(), mag_db, phase_deg, coherence))
}

/// Combine measurements with explicit options
///
/// Options are validated first. Sources without frequency bins fail with
/// [`CombineError::EmptyGrid`], so an empty measurement only ever means failure.
pub fn combine_with(
    sources: &[TransferFunction],
    operation: MathOperation,
    options: &CombineOptions,
) -> Result<TransferFunction, CombineError> {
    let refs: Vec<&TransferFunction> = sources.iter().collect();
    combine_refs(&refs, operation, options)
}

/// Single-source copy: same curves, wrapped phase, no impulse response
fn copy_of(source: &TransferFunction) -> TransferFunction {
    TransferFunction::new(
        source.freqs.clone(),
        source.mag_db.clone(),
        source.phase_deg.iter().map(|&p| wrap_phase_deg(p)).collect(),
        source.coherence.clone(),
    )
}

/// Coherence-weighted average of one bin
///
/// Returns the combined complex value and the weighted mean of the raw coherences.
fn average_bin(
    sources: &[&TransferFunction],
    unwrapped: &[Vec<f64>],
    bin: usize,
    weight_floor: f64,
) -> (Complex64, f64) {
    let mut total_weight = 0.0;
    let mut log_mag_sum = 0.0;
    let mut phase_sum = 0.0;
    let mut coh_weight = 0.0;
    let mut coh_sum = 0.0;
    // (linear magnitude, unwrapped phase) of every source with signal in this bin
    let mut positive: Vec<(f64, f64)> = Vec::with_capacity(sources.len());

    for (source, phase) in sources.iter().zip(unwrapped) {
        let raw_coh = source.coherence[bin];
        let weight = raw_coh.max(weight_floor);
        coh_weight += weight;
        coh_sum += weight * raw_coh;

        let magnitude = polar_db_to_complex(source.mag_db[bin], phase[bin]).norm();
        if magnitude > 0.0 {
            positive.push((magnitude, phase[bin]));
            total_weight += weight;
            log_mag_sum += weight * magnitude.ln();
            phase_sum += weight * phase[bin];
        }
    }

    let coherence = if coh_weight > 0.0 { coh_sum / coh_weight } else { 0.0 };

    if positive.is_empty() {
        return (Complex64::new(0.0, 0.0), coherence);
    }

    let (magnitude, phase_deg) = if total_weight > 0.0 && total_weight.is_finite() {
        ((log_mag_sum / total_weight).exp(), phase_sum / total_weight)
    } else {
        // Weights unusable: plain geometric mean of the bins that carry signal.
        let n = positive.len() as f64;
        let log_mean = positive.iter().map(|(m, _)| m.ln()).sum::<f64>() / n;
        let phase_mean = positive.iter().map(|(_, p)| p).sum::<f64>() / n;
        (log_mean.exp(), phase_mean)
    };

    (Complex64::from_polar(magnitude, phase_deg.to_radians()), coherence)
}
