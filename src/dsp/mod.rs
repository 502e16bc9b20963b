//! Filter synthesis and analytic frequency response
//!
//! Data flows one way: descriptors -> coefficients -> response curves.

pub mod biquad;
pub mod complex;
pub mod eq;
pub mod filter;
pub mod presets;
pub mod response;
pub mod target;

pub use biquad::{synthesize, SecondOrderSection};
pub use eq::{apply_eq, apply_eq_to_measurement, eq_response_db};
pub use filter::{FilterDescriptor, FilterType, GenericFilter, ParametricFilter};
pub use presets::{map_preset, DevicePreset, HfcPosition, PresetKind, PresetSetting};
pub use response::{evaluate_complex, evaluate_magnitude_db, evaluate_phase_deg};
pub use target::{CustomTarget, TargetCurve};
