//! Error handling for tfmath
//!
//! Precondition failures are recoverable and carry enough context for the
//! caller to explain what went wrong. Numeric degeneracy is never an error;
//! it is absorbed by the clamps in [`crate::dsp::complex`].

use thiserror::Error;

use crate::measurement::MeasurementId;

/// Result type alias for tfmath operations
pub type Result<T> = std::result::Result<T, TfError>;

/// Main error type for tfmath operations
#[derive(Error, Debug)]
pub enum TfError {
    // Descriptor Errors
    #[error("Unknown device preset kind: {kind}")]
    UnknownPresetKind { kind: String },

    // Input Errors
    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid frequency range: {start_hz} Hz to {end_hz} Hz")]
    InvalidFrequencyRange { start_hz: f64, end_hz: f64 },

    #[error("Invalid configuration: {param} = {value} (expected {expected})")]
    InvalidConfig {
        param: String,
        value: String,
        expected: String,
    },

    // Combination Errors
    #[error(transparent)]
    Combine(#[from] CombineError),

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TfError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            TfError::UnknownPresetKind { .. } => "UNKNOWN_PRESET_KIND",
            TfError::LengthMismatch { .. } => "LENGTH_MISMATCH",
            TfError::InvalidFrequencyRange { .. } => "INVALID_FREQUENCY_RANGE",
            TfError::InvalidConfig { .. } => "INVALID_CONFIG",
            TfError::Combine(inner) => inner.error_code(),
            TfError::Io(_) => "IO_ERROR",
            TfError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable by the caller
    ///
    /// An unknown preset kind can only come from a table miss, which is a
    /// programming error rather than bad input.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, TfError::UnknownPresetKind { .. })
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            TfError::UnknownPresetKind { .. } => vec![
                "Check the preset name against the supported device presets",
                "Use a parametric filter with explicit frequency, gain and Q instead",
            ],
            TfError::LengthMismatch { .. } => vec![
                "Every curve must have one value per frequency bin",
                "Resample the curve onto the same frequency grid first",
            ],
            TfError::InvalidFrequencyRange { .. } => vec![
                "Start frequency must be positive",
                "End frequency must not be below the start frequency",
            ],
            TfError::InvalidConfig { .. } => vec![
                "Sample rate must be positive and finite",
                "Remove the offending key to fall back to its default",
            ],
            TfError::Combine(inner) => inner.recovery_suggestions(),
            TfError::Io(_) => vec!["Check the file path is correct and readable"],
            TfError::Serialization(_) => {
                vec!["Check the JSON document matches the expected schema"]
            }
        }
    }
}

/// Precondition failures of the transfer-function combiner
///
/// These never abort a computation: the combiner reports them together with
/// an empty measurement (see [`crate::measurement::CombineOutcome`]).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CombineError {
    #[error("No source measurements supplied")]
    NoSources,

    #[error("Subtract needs exactly 2 sources, got {count}")]
    SubtractArity { count: usize },

    #[error("Source measurements have no frequency bins")]
    EmptyGrid,

    #[error("Invalid combine options: {reason}")]
    InvalidOptions { reason: String },

    #[error("Source {source_index} has {actual} frequency bins, expected {expected}")]
    GridLengthMismatch {
        source_index: usize,
        expected: usize,
        actual: usize,
    },

    #[error(
        "Source {source_index} frequency grid differs at bin {bin}: {actual_hz} vs {expected_hz} Hz"
    )]
    GridValueMismatch {
        source_index: usize,
        bin: usize,
        expected_hz: f64,
        actual_hz: f64,
    },

    #[error("Source {source_index} {series} has {actual} values, expected {expected}")]
    SeriesLengthMismatch {
        source_index: usize,
        series: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Source measurement not found: {id}")]
    MissingSource { id: MeasurementId },
}

impl CombineError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            CombineError::NoSources => "NO_SOURCES",
            CombineError::SubtractArity { .. } => "SUBTRACT_ARITY",
            CombineError::EmptyGrid => "EMPTY_GRID",
            CombineError::InvalidOptions { .. } => "INVALID_OPTIONS",
            CombineError::GridLengthMismatch { .. } => "GRID_LENGTH_MISMATCH",
            CombineError::GridValueMismatch { .. } => "GRID_VALUE_MISMATCH",
            CombineError::SeriesLengthMismatch { .. } => "SERIES_LENGTH_MISMATCH",
            CombineError::MissingSource { .. } => "MISSING_SOURCE",
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            CombineError::NoSources => vec!["Add at least one source measurement to the trace"],
            CombineError::SubtractArity { .. } => vec![
                "Select exactly two measurements to subtract",
                "Use sum or average to combine more than two measurements",
            ],
            CombineError::EmptyGrid => vec!["Measure or load data before combining"],
            CombineError::InvalidOptions { .. } => vec![
                "Grid tolerance must be a non-negative number of Hz",
                "Coherence weight floor must lie in (0, 1]",
            ],
            CombineError::GridLengthMismatch { .. } | CombineError::GridValueMismatch { .. } => {
                vec![
                    "Measurements must share one frequency grid",
                    "Re-capture with the same FFT size and sample rate",
                ]
            }
            CombineError::SeriesLengthMismatch { .. } => {
                vec!["The measurement is corrupt: every series must match its frequency grid"]
            }
            CombineError::MissingSource { .. } => vec![
                "The source measurement was deleted",
                "Pick a replacement source or remove the math trace",
            ],
        }
    }
}
