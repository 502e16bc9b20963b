//! Engine configuration
//!
//! Loaded from a JSON document; every key is optional and falls back to the
//! defaults below.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TfError};

/// Default sample rate for filter synthesis, in Hz
pub const DEFAULT_SAMPLE_RATE: f64 = 48000.0;

/// Two grids are the same if every bin agrees within this many Hz
pub const DEFAULT_GRID_TOLERANCE_HZ: f64 = 1e-6;

/// Smallest coherence weight a source gets when averaging
pub const DEFAULT_COHERENCE_WEIGHT_FLOOR: f64 = 0.1;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sample rate used to synthesize and evaluate filters
    pub sample_rate: f64,
    /// Transfer-function combiner settings
    pub combine: CombineOptions,
    /// Analytic tilt target settings
    pub tilt: TiltOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            combine: CombineOptions::default(),
            tilt: TiltOptions::default(),
        }
    }
}

impl EngineConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&text)?;
        config.validate()?;
        tracing::debug!(
            path = %path.display(),
            sample_rate = config.sample_rate,
            "loaded configuration"
        );
        Ok(config)
    }

    /// Validate parameter ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(invalid("sample_rate", self.sample_rate, "a positive number of Hz"));
        }
        self.combine.validate()?;
        self.tilt.validate()
    }
}

fn invalid(param: &str, value: f64, expected: &str) -> TfError {
    TfError::InvalidConfig {
        param: param.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    }
}

/// Settings of the transfer-function combiner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombineOptions {
    /// Per-bin frequency tolerance when checking grid compatibility
    pub grid_tolerance_hz: f64,
    /// Minimum weight of a source in a coherence-weighted average
    pub coherence_weight_floor: f64,
}

impl Default for CombineOptions {
    fn default() -> Self {
        Self {
            grid_tolerance_hz: DEFAULT_GRID_TOLERANCE_HZ,
            coherence_weight_floor: DEFAULT_COHERENCE_WEIGHT_FLOOR,
        }
    }
}

impl CombineOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.grid_tolerance_hz.is_finite() && self.grid_tolerance_hz >= 0.0) {
            return Err(invalid(
                "combine.grid_tolerance_hz",
                self.grid_tolerance_hz,
                "a non-negative number of Hz",
            ));
        }
        if !(self.coherence_weight_floor > 0.0 && self.coherence_weight_floor <= 1.0) {
            return Err(invalid(
                "combine.coherence_weight_floor",
                self.coherence_weight_floor,
                "a value in (0, 1]",
            ));
        }
        Ok(())
    }
}

/// Analytic tilt target: `db_per_octave * log2(f / pivot_hz)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltOptions {
    pub db_per_octave: f64,
    pub pivot_hz: f64,
}

impl Default for TiltOptions {
    fn default() -> Self {
        Self {
            db_per_octave: -1.0,
            pivot_hz: 1000.0,
        }
    }
}

impl TiltOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.db_per_octave.is_finite() {
            return Err(invalid("tilt.db_per_octave", self.db_per_octave, "a finite slope"));
        }
        if !(self.pivot_hz.is_finite() && self.pivot_hz > 0.0) {
            return Err(invalid("tilt.pivot_hz", self.pivot_hz, "a positive number of Hz"));
        }
        Ok(())
    }
}
