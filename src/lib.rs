//! tfmath - Transfer-Function Math for Loudspeaker/Room Measurements
//!
//! A pure function library with no I/O of its own:
//! 1. Filter synthesis: parametric bands and device presets -> second-order sections
//! 2. Analytic frequency response of section cascades on arbitrary grids
//! 3. EQ application to magnitude curves
//! 4. Math traces: sum, average and subtract of transfer-function measurements
//!
//! Every operation is deterministic, so callers may evaluate independent
//! traces or frequency bins in parallel.

pub mod cli;
pub mod config;
pub mod dsp;
pub mod error;
pub mod measurement;

pub use config::{CombineOptions, EngineConfig, TiltOptions};
pub use dsp::{
    apply_eq, evaluate_magnitude_db, synthesize, FilterDescriptor, ParametricFilter,
    SecondOrderSection, TargetCurve,
};
pub use error::{CombineError, Result, TfError};
pub use measurement::{
    combine, combine_or_empty, CombineOutcome, MathOperation, MathTrace, MeasurementId,
    TransferFunction,
};
