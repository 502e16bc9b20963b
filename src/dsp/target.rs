//! Reference target curves for overlay comparison
//!
//! `Flat` and `Tilt` are analytic. `Custom` is a cascade of filters whose
//! sections are synthesized once per sample rate and kept in an explicit
//! cache; a different sample rate gets its own entry, and [`CustomTarget::invalidate`]
//! drops every entry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use super::biquad::{synthesize, SecondOrderSection};
use super::filter::{FilterDescriptor, ParametricFilter};
use super::response::section_magnitude_db;
use crate::config::TiltOptions;
use crate::error::Result;

/// Built-in reference curves
#[derive(Debug)]
pub enum TargetCurve {
    /// 0 dB everywhere
    Flat,
    /// Straight line in dB per octave through a pivot frequency
    Tilt(TiltOptions),
    /// Cascade of filters
    Custom(CustomTarget),
}

impl TargetCurve {
    /// Name used by the plotting layer
    pub fn name(&self) -> &'static str {
        match self {
            TargetCurve::Flat => "flat",
            TargetCurve::Tilt(_) => "tilt",
            TargetCurve::Custom(_) => "custom",
        }
    }

    /// Target level in dB at one frequency
    pub fn evaluate(&self, freq: f64, sample_rate: f64) -> Result<f64> {
        match self {
            TargetCurve::Flat => Ok(0.0),
            TargetCurve::Tilt(tilt) => Ok(tilt_db(tilt, freq)),
            TargetCurve::Custom(custom) => custom.evaluate(freq, sample_rate),
        }
    }

    /// Target level in dB over a whole grid
    pub fn evaluate_curve(&self, freqs: &[f64], sample_rate: f64) -> Result<Vec<f64>> {
        match self {
            TargetCurve::Custom(custom) => custom.evaluate_curve(freqs, sample_rate),
            _ => freqs.iter().map(|&f| self.evaluate(f, sample_rate)).collect(),
        }
    }
}

fn tilt_db(tilt: &TiltOptions, freq: f64) -> f64 {
    if freq <= 0.0 || tilt.pivot_hz <= 0.0 {
        return 0.0;
    }
    tilt.db_per_octave * (freq / tilt.pivot_hz).log2()
}

/// Filters plus a per-sample-rate section cache
#[derive(Debug, Serialize, Deserialize)]
pub struct CustomTarget {
    filters: Vec<FilterDescriptor>,
    #[serde(skip)]
    cache: Mutex<HashMap<u64, Arc<[Stage]>>>,
}

/// A synthesized filter and how many times it is cascaded
#[derive(Debug, Clone, Copy)]
struct Stage {
    section: SecondOrderSection,
    count: f64,
}

impl Default for CustomTarget {
    /// House curve: gentle low-end lift and high-end roll-off
    fn default() -> Self {
        Self::new(vec![
            ParametricFilter::low_shelf(120.0, 4.0).into(),
            ParametricFilter::high_shelf(8000.0, -3.0).into(),
        ])
    }
}

impl Clone for CustomTarget {
    fn clone(&self) -> Self {
        Self::new(self.filters.clone())
    }
}

impl CustomTarget {
    pub fn new(filters: Vec<FilterDescriptor>) -> Self {
        Self {
            filters,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn filters(&self) -> &[FilterDescriptor] {
        &self.filters
    }

    /// Replace the filters; cached sections are dropped
    pub fn set_filters(&mut self, filters: Vec<FilterDescriptor>) {
        self.filters = filters;
        self.invalidate();
    }

    /// Drop every cached cascade
    pub fn invalidate(&self) {
        self.lock_cache().clear();
    }

    /// Sample rates with a cached cascade
    pub fn cached_sample_rates(&self) -> Vec<f64> {
        let mut rates: Vec<f64> = self
            .lock_cache()
            .keys()
            .map(|&bits| f64::from_bits(bits))
            .collect();
        rates.sort_by(f64::total_cmp);
        rates
    }

    pub fn evaluate(&self, freq: f64, sample_rate: f64) -> Result<f64> {
        let stages = self.stages(sample_rate)?;
        Ok(stages_db(&stages, sample_rate, freq))
    }

    pub fn evaluate_curve(&self, freqs: &[f64], sample_rate: f64) -> Result<Vec<f64>> {
        let stages = self.stages(sample_rate)?;
        Ok(freqs.iter().map(|&f| stages_db(&stages, sample_rate, f)).collect())
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<u64, Arc<[Stage]>>> {
        // The cache only ever holds complete entries, so a poisoned lock is still usable.
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn stages(&self, sample_rate: f64) -> Result<Arc<[Stage]>> {
        let key = sample_rate.to_bits();
        if let Some(stages) = self.lock_cache().get(&key) {
            return Ok(Arc::clone(stages));
        }

        let stages: Arc<[Stage]> = self
            .filters
            .iter()
            .filter(|d| d.is_enabled())
            .map(|d| {
                Ok(Stage {
                    section: synthesize(d, sample_rate)?,
                    count: d.section_count() as f64,
                })
            })
            .collect::<Result<Vec<_>>>()?
            .into();

        tracing::debug!(sample_rate, stages = stages.len(), "synthesized custom target cascade");
        self.lock_cache().insert(key, Arc::clone(&stages));
        Ok(stages)
    }
}

fn stages_db(stages: &[Stage], sample_rate: f64, freq: f64) -> f64 {
    stages
        .iter()
        .map(|stage| stage.count * section_magnitude_db(&stage.section, sample_rate, freq))
        .sum()
}
