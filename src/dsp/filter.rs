//! Filter descriptors
//!
//! A [`FilterDescriptor`] is either a generic parametric band or a device
//! preset. Presets are reduced to a [`GenericFilter`] by
//! [`super::presets::map_preset`] before any coefficients are synthesized.

use serde::{Deserialize, Serialize};

use super::presets::DevicePreset;

/// Base slope of a single second-order pass section
pub const BASE_SLOPE_DB_PER_OCTAVE: f64 = 12.0;

/// Filter shape of a generic band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    /// Bell curve boost/cut
    #[default]
    Peaking,
    /// Boost/cut below frequency
    LowShelf,
    /// Boost/cut above frequency
    HighShelf,
    /// Remove above frequency
    LowPass,
    /// Remove below frequency
    HighPass,
}

impl FilterType {
    /// Pass types ignore gain and may be cascaded for steeper slopes
    pub fn is_pass(self) -> bool {
        matches!(self, FilterType::LowPass | FilterType::HighPass)
    }

    pub fn is_shelf(self) -> bool {
        matches!(self, FilterType::LowShelf | FilterType::HighShelf)
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            FilterType::Peaking => "Peaking",
            FilterType::LowShelf => "Low Shelf",
            FilterType::HighShelf => "High Shelf",
            FilterType::LowPass => "Low Pass",
            FilterType::HighPass => "High Pass",
        }
    }
}

/// The three-parameter filter every descriptor reduces to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenericFilter {
    pub filter_type: FilterType,
    /// Center/corner frequency in Hz
    pub frequency: f64,
    /// Gain in dB (ignored by pass types)
    pub gain_db: f64,
    /// Q factor (ignored by shelves, which use `shelf_slope`)
    pub q: f64,
    /// Shelf slope S; `None` means the gentle default of 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shelf_slope: Option<f64>,
}

impl GenericFilter {
    pub fn new(filter_type: FilterType, frequency: f64, gain_db: f64, q: f64) -> Self {
        Self {
            filter_type,
            frequency,
            gain_db,
            q,
            shelf_slope: None,
        }
    }
}

/// A user-editable parametric band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParametricFilter {
    pub filter_type: FilterType,
    /// Center/corner frequency in Hz
    pub frequency: f64,
    /// Gain in dB
    #[serde(default)]
    pub gain_db: f64,
    /// Q factor / bandwidth
    #[serde(default = "default_q")]
    pub q: f64,
    /// Roll-off of pass types: 12, 24 or 48 dB/octave
    #[serde(default = "default_slope")]
    pub slope_db_per_octave: f64,
    /// Explicit shelf slope S for shelving types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shelf_slope: Option<f64>,
    /// Whether this band is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_q() -> f64 {
    std::f64::consts::FRAC_1_SQRT_2
}

fn default_slope() -> f64 {
    BASE_SLOPE_DB_PER_OCTAVE
}

pub(crate) fn default_enabled() -> bool {
    true
}

impl Default for ParametricFilter {
    fn default() -> Self {
        Self {
            filter_type: FilterType::Peaking,
            frequency: 1000.0,
            gain_db: 0.0,
            q: 1.0,
            slope_db_per_octave: BASE_SLOPE_DB_PER_OCTAVE,
            shelf_slope: None,
            enabled: true,
        }
    }
}

impl ParametricFilter {
    /// Create a new band with the specified parameters
    pub fn new(filter_type: FilterType, frequency: f64, gain_db: f64, q: f64) -> Self {
        Self {
            filter_type,
            frequency,
            gain_db,
            q,
            ..Default::default()
        }
    }

    /// Create a peaking band
    pub fn peaking(frequency: f64, gain_db: f64, q: f64) -> Self {
        Self::new(FilterType::Peaking, frequency, gain_db, q)
    }

    /// Create a low shelf band
    pub fn low_shelf(frequency: f64, gain_db: f64) -> Self {
        Self::new(FilterType::LowShelf, frequency, gain_db, default_q())
    }

    /// Create a high shelf band
    pub fn high_shelf(frequency: f64, gain_db: f64) -> Self {
        Self::new(FilterType::HighShelf, frequency, gain_db, default_q())
    }

    /// Create a low-pass band
    pub fn low_pass(frequency: f64, q: f64) -> Self {
        Self::new(FilterType::LowPass, frequency, 0.0, q)
    }

    /// Create a high-pass band
    pub fn high_pass(frequency: f64, q: f64) -> Self {
        Self::new(FilterType::HighPass, frequency, 0.0, q)
    }

    pub fn with_slope(mut self, slope_db_per_octave: f64) -> Self {
        self.slope_db_per_octave = slope_db_per_octave;
        self
    }

    pub fn with_shelf_slope(mut self, shelf_slope: f64) -> Self {
        self.shelf_slope = Some(shelf_slope);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Number of identical second-order sections this band expands into
    ///
    /// Only pass types cascade; `round(slope / 12)`, at least 1.
    pub fn section_count(&self) -> usize {
        if !self.filter_type.is_pass() {
            return 1;
        }
        let sections = (self.slope_db_per_octave / BASE_SLOPE_DB_PER_OCTAVE).round();
        if sections.is_finite() && sections >= 1.0 {
            sections as usize
        } else {
            1
        }
    }

    pub fn to_generic(&self) -> GenericFilter {
        GenericFilter {
            filter_type: self.filter_type,
            frequency: self.frequency,
            gain_db: self.gain_db,
            q: self.q,
            shelf_slope: self.shelf_slope.filter(|_| self.filter_type.is_shelf()),
        }
    }
}

/// Any filter a caller can place in an EQ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterDescriptor {
    Parametric(ParametricFilter),
    Preset(DevicePreset),
}

impl FilterDescriptor {
    pub fn is_enabled(&self) -> bool {
        match self {
            FilterDescriptor::Parametric(band) => band.enabled,
            FilterDescriptor::Preset(preset) => preset.enabled,
        }
    }

    /// Sections contributed when applied as part of an EQ
    pub fn section_count(&self) -> usize {
        match self {
            FilterDescriptor::Parametric(band) => band.section_count(),
            FilterDescriptor::Preset(_) => 1,
        }
    }
}

impl From<ParametricFilter> for FilterDescriptor {
    fn from(band: ParametricFilter) -> Self {
        FilterDescriptor::Parametric(band)
    }
}

impl From<DevicePreset> for FilterDescriptor {
    fn from(preset: DevicePreset) -> Self {
        FilterDescriptor::Preset(preset)
    }
}
