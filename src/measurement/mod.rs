//! Transfer-function measurements and math traces
//!
//! A measurement is a set of parallel series over one ascending frequency
//! grid. Math traces derive new measurements from existing ones.

mod combine;
mod math_trace;

pub use combine::{combine, combine_or_empty, combine_with, CombineOutcome};
pub use math_trace::{MathOperation, MathTrace, MeasurementStore};

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CombineError, Result, TfError};

/// Reference to a stored measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementId(pub Uuid);

impl MeasurementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MeasurementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MeasurementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Magnitude, phase and coherence versus frequency
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferFunction {
    /// Ascending frequencies in Hz
    pub freqs: Vec<f64>,
    /// Magnitude in dB per bin
    pub mag_db: Vec<f64>,
    /// Phase in degrees per bin, within (-180, 180]
    pub phase_deg: Vec<f64>,
    /// Coherence in [0, 1] per bin
    pub coherence: Vec<f64>,
    /// Time-domain impulse response; empty for derived traces
    #[serde(default)]
    pub impulse_response: Vec<f64>,
}

impl TransferFunction {
    /// Build a measurement without an impulse response
    pub fn new(
        freqs: Vec<f64>,
        mag_db: Vec<f64>,
        phase_deg: Vec<f64>,
        coherence: Vec<f64>,
    ) -> Self {
        Self {
            freqs,
            mag_db,
            phase_deg,
            coherence,
            impulse_response: Vec::new(),
        }
    }

    /// The "no result" sentinel
    pub fn empty() -> Self {
        Self::default()
    }

    /// A sentinel has no frequency bins
    pub fn is_empty(&self) -> bool {
        self.freqs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.freqs.len()
    }

    /// Check that every series matches the frequency grid
    pub fn validate(&self) -> std::result::Result<(), CombineError> {
        self.validate_as(0)
    }

    pub(crate) fn validate_as(&self, source_index: usize) -> std::result::Result<(), CombineError> {
        let expected = self.freqs.len();
        for (series, actual) in [
            ("mag_db", self.mag_db.len()),
            ("phase_deg", self.phase_deg.len()),
            ("coherence", self.coherence.len()),
        ] {
            if actual != expected {
                return Err(CombineError::SeriesLengthMismatch {
                    source_index,
                    series,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Whether `other` shares this measurement's grid within `tolerance_hz`
    pub fn is_compatible_with(&self, other: &TransferFunction, tolerance_hz: f64) -> bool {
        check_grid(&self.freqs, &other.freqs, 1, tolerance_hz).is_ok()
    }
}

/// Compare `candidate` against the reference grid
pub(crate) fn check_grid(
    reference: &[f64],
    candidate: &[f64],
    source_index: usize,
    tolerance_hz: f64,
) -> std::result::Result<(), CombineError> {
    if reference.len() != candidate.len() {
        return Err(CombineError::GridLengthMismatch {
            source_index,
            expected: reference.len(),
            actual: candidate.len(),
        });
    }
    for (bin, (&expected_hz, &actual_hz)) in reference.iter().zip(candidate).enumerate() {
        // Negated so NaN frequencies count as a mismatch
        if !((expected_hz - actual_hz).abs() <= tolerance_hz) {
            return Err(CombineError::GridValueMismatch {
                source_index,
                bin,
                expected_hz,
                actual_hz,
            });
        }
    }
    Ok(())
}

/// Logarithmically spaced frequency grid, inclusive of both ends
///
/// `start_hz` must be positive, and `end_hz` above it whenever more than one
/// point is requested.
pub fn log_frequency_grid(start_hz: f64, end_hz: f64, points: usize) -> Result<Vec<f64>> {
    let ascending = points <= 1 || end_hz > start_hz;
    if !(start_hz.is_finite() && start_hz > 0.0 && end_hz.is_finite() && ascending) {
        return Err(TfError::InvalidFrequencyRange { start_hz, end_hz });
    }

    Ok(match points {
        0 => Vec::new(),
        1 => vec![start_hz],
        _ => {
            let ratio = (end_hz / start_hz).ln();
            (0..points)
                .map(|i| start_hz * (ratio * i as f64 / (points - 1) as f64).exp())
                .collect()
        }
    })
}
