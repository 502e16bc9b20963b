//! Device preset mapping
//!
//! Vendor processors expose single-knob EQ controls. Each one is a fixed
//! filter shape at a fixed frequency; the user only turns the gain (or picks
//! a position). [`map_preset`] resolves a preset through a closed lookup table
//! into the [`GenericFilter`] the coefficient synthesizer understands.

use serde::{Deserialize, Serialize};

use super::filter::{default_enabled, FilterType, GenericFilter};
use crate::error::{Result, TfError};

/// Q used for shelf presets; shelves are shaped by their slope S instead
const SHELF_Q: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Position of the discrete high-frequency-compensation selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HfcPosition {
    /// Moderate air-absorption compensation
    Hfc1,
    /// Strong air-absorption compensation
    Hfc2,
}

impl HfcPosition {
    /// Shelf gain for this position
    pub fn gain_db(self) -> f64 {
        match self {
            HfcPosition::Hfc1 => -3.0,
            HfcPosition::Hfc2 => -6.0,
        }
    }
}

/// The control a preset exposes, tagged by preset kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PresetSetting {
    /// Vocal presence bell
    HumanVoice { gain_db: f64 },
    /// Coupling compensation for arrayed cabinets
    Cpl { gain_db: f64 },
    /// Discrete high-frequency compensation
    Hfc { position: HfcPosition },
    /// Array spectral compensation shelf
    Asc { gain_db: f64 },
    /// Long-throw high-frequency shelf
    HfThrow { gain_db: f64 },
    /// Air absorption compensation
    AirCompensation { gain_db: f64 },
    /// Low-frequency boost
    LowBoost { gain_db: f64 },
    /// Subsonic shelf
    Subsonic { gain_db: f64 },
    /// Generic high-frequency shelf
    HfShelf { gain_db: f64 },
}

impl PresetSetting {
    pub fn kind(&self) -> PresetKind {
        match self {
            PresetSetting::HumanVoice { .. } => PresetKind::HumanVoice,
            PresetSetting::Cpl { .. } => PresetKind::Cpl,
            PresetSetting::Hfc { .. } => PresetKind::Hfc,
            PresetSetting::Asc { .. } => PresetKind::Asc,
            PresetSetting::HfThrow { .. } => PresetKind::HfThrow,
            PresetSetting::AirCompensation { .. } => PresetKind::AirCompensation,
            PresetSetting::LowBoost { .. } => PresetKind::LowBoost,
            PresetSetting::Subsonic { .. } => PresetKind::Subsonic,
            PresetSetting::HfShelf { .. } => PresetKind::HfShelf,
        }
    }

    /// Gain selected by the preset's single control
    pub fn gain_db(&self) -> f64 {
        match *self {
            PresetSetting::Hfc { position } => position.gain_db(),
            PresetSetting::HumanVoice { gain_db }
            | PresetSetting::Cpl { gain_db }
            | PresetSetting::Asc { gain_db }
            | PresetSetting::HfThrow { gain_db }
            | PresetSetting::AirCompensation { gain_db }
            | PresetSetting::LowBoost { gain_db }
            | PresetSetting::Subsonic { gain_db }
            | PresetSetting::HfShelf { gain_db } => gain_db,
        }
    }
}

/// A device preset as placed in an EQ
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DevicePreset {
    #[serde(flatten)]
    pub setting: PresetSetting,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl DevicePreset {
    pub fn new(setting: PresetSetting) -> Self {
        Self {
            setting,
            enabled: true,
        }
    }

    pub fn kind(&self) -> PresetKind {
        self.setting.kind()
    }
}

/// Discriminant of [`PresetSetting`], used as the lookup-table key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetKind {
    HumanVoice,
    Cpl,
    Hfc,
    Asc,
    HfThrow,
    AirCompensation,
    LowBoost,
    Subsonic,
    HfShelf,
}

impl PresetKind {
    pub const ALL: [PresetKind; 9] = [
        PresetKind::HumanVoice,
        PresetKind::Cpl,
        PresetKind::Hfc,
        PresetKind::Asc,
        PresetKind::HfThrow,
        PresetKind::AirCompensation,
        PresetKind::LowBoost,
        PresetKind::Subsonic,
        PresetKind::HfShelf,
    ];

    /// Wire name, as used in JSON documents
    pub fn name(self) -> &'static str {
        match self {
            PresetKind::HumanVoice => "human_voice",
            PresetKind::Cpl => "cpl",
            PresetKind::Hfc => "hfc",
            PresetKind::Asc => "asc",
            PresetKind::HfThrow => "hf_throw",
            PresetKind::AirCompensation => "air_compensation",
            PresetKind::LowBoost => "low_boost",
            PresetKind::Subsonic => "subsonic",
            PresetKind::HfShelf => "hf_shelf",
        }
    }

    /// Parse a wire name
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| TfError::UnknownPresetKind {
                kind: name.to_string(),
            })
    }
}

/// One row of the preset table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetEntry {
    pub kind: PresetKind,
    pub filter_type: FilterType,
    pub frequency: f64,
    pub q: f64,
}

const PRESET_TABLE: [PresetEntry; 9] = [
    PresetEntry {
        kind: PresetKind::HumanVoice,
        filter_type: FilterType::Peaking,
        frequency: 2500.0,
        q: 1.4,
    },
    PresetEntry {
        kind: PresetKind::Cpl,
        filter_type: FilterType::LowShelf,
        frequency: 300.0,
        q: SHELF_Q,
    },
    PresetEntry {
        kind: PresetKind::Hfc,
        filter_type: FilterType::HighShelf,
        frequency: 10_000.0,
        q: SHELF_Q,
    },
    PresetEntry {
        kind: PresetKind::Asc,
        filter_type: FilterType::HighShelf,
        frequency: 2000.0,
        q: SHELF_Q,
    },
    PresetEntry {
        kind: PresetKind::HfThrow,
        filter_type: FilterType::HighShelf,
        frequency: 6000.0,
        q: SHELF_Q,
    },
    PresetEntry {
        kind: PresetKind::AirCompensation,
        filter_type: FilterType::HighShelf,
        frequency: 12_000.0,
        q: SHELF_Q,
    },
    PresetEntry {
        kind: PresetKind::LowBoost,
        filter_type: FilterType::LowShelf,
        frequency: 80.0,
        q: SHELF_Q,
    },
    PresetEntry {
        kind: PresetKind::Subsonic,
        filter_type: FilterType::LowShelf,
        frequency: 30.0,
        q: SHELF_Q,
    },
    PresetEntry {
        kind: PresetKind::HfShelf,
        filter_type: FilterType::HighShelf,
        frequency: 8000.0,
        q: SHELF_Q,
    },
];

/// The closed preset lookup table
pub fn preset_table() -> &'static [PresetEntry] {
    &PRESET_TABLE
}

/// Reduce a device preset to its generic filter
pub fn map_preset(preset: &DevicePreset) -> Result<GenericFilter> {
    map_with_table(&preset.setting, preset_table())
}

fn map_with_table(setting: &PresetSetting, table: &[PresetEntry]) -> Result<GenericFilter> {
    let kind = setting.kind();
    let entry = table.iter().find(|entry| entry.kind == kind).ok_or_else(|| {
        tracing::error!(kind = kind.name(), "device preset missing from lookup table");
        debug_assert!(false, "device preset {} missing from lookup table", kind.name());
        TfError::UnknownPresetKind {
            kind: kind.name().to_string(),
        }
    })?;

    Ok(GenericFilter::new(
        entry.filter_type,
        entry.frequency,
        setting.gain_db(),
        entry.q,
    ))
}
