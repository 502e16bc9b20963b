//! Math traces
//!
//! A math trace names a combination of stored measurements. It owns no
//! samples; [`MathTrace::evaluate`] recomputes it from the current sources
//! every time, so it always reflects the latest data.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::combine::{combine_refs, CombineOutcome};
use super::{MeasurementId, TransferFunction};
use crate::config::CombineOptions;
use crate::error::CombineError;

/// How the sources of a math trace are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MathOperation {
    /// Complex sum of all sources
    Sum,
    /// Coherence-weighted average
    Average,
    /// First source minus second
    Subtract,
}

impl MathOperation {
    pub fn name(self) -> &'static str {
        match self {
            MathOperation::Sum => "sum",
            MathOperation::Average => "average",
            MathOperation::Subtract => "subtract",
        }
    }

    /// Check the number of sources this operation accepts
    pub fn check_arity(self, count: usize) -> Result<(), CombineError> {
        match (self, count) {
            (_, 0) => Err(CombineError::NoSources),
            (MathOperation::Subtract, 2) => Ok(()),
            (MathOperation::Subtract, count) => Err(CombineError::SubtractArity { count }),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for MathOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where math traces look up their sources
pub trait MeasurementStore {
    fn measurement(&self, id: &MeasurementId) -> Option<&TransferFunction>;
}

impl MeasurementStore for HashMap<MeasurementId, TransferFunction> {
    fn measurement(&self, id: &MeasurementId) -> Option<&TransferFunction> {
        self.get(id)
    }
}

impl MeasurementStore for BTreeMap<MeasurementId, TransferFunction> {
    fn measurement(&self, id: &MeasurementId) -> Option<&TransferFunction> {
        self.get(id)
    }
}

/// A named, derived measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathTrace {
    pub name: String,
    pub operation: MathOperation,
    /// Ordered; for `subtract` the result is `sources[0] - sources[1]`
    pub source_ids: Vec<MeasurementId>,
}

impl MathTrace {
    pub fn new(
        name: impl Into<String>,
        operation: MathOperation,
        source_ids: Vec<MeasurementId>,
    ) -> Self {
        Self {
            name: name.into(),
            operation,
            source_ids,
        }
    }

    /// Check the source count against the operation
    pub fn validate(&self) -> Result<(), CombineError> {
        self.operation.check_arity(self.source_ids.len())
    }

    /// Recompute the trace from the store's current measurements
    pub fn evaluate(&self, store: &impl MeasurementStore) -> CombineOutcome {
        self.evaluate_with(store, &CombineOptions::default())
    }

    pub fn evaluate_with(
        &self,
        store: &impl MeasurementStore,
        options: &CombineOptions,
    ) -> CombineOutcome {
        tracing::debug!(
            trace = %self.name,
            operation = self.operation.name(),
            "evaluating math trace"
        );
        self.resolve(store)
            .and_then(|sources| combine_refs(&sources, self.operation, options))
            .into()
    }

    fn resolve<'a>(
        &self,
        store: &'a impl MeasurementStore,
    ) -> Result<Vec<&'a TransferFunction>, CombineError> {
        self.validate()?;
        self.source_ids
            .iter()
            .map(|id| store.measurement(id).ok_or(CombineError::MissingSource { id: *id }))
            .collect()
    }

    /// Whether the trace depends on `id`, i.e. must be recomputed when it changes
    pub fn depends_on(&self, id: &MeasurementId) -> bool {
        self.source_ids.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flat(mag_db: f64, coherence: f64) -> TransferFunction {
        TransferFunction::new(
            vec![100.0, 1000.0],
            vec![mag_db; 2],
            vec![0.0; 2],
            vec![coherence; 2],
        )
    }

    #[test]
    fn test_arity_rules() {
        assert_eq!(MathOperation::Sum.check_arity(1), Ok(()));
        assert_eq!(MathOperation::Average.check_arity(5), Ok(()));
        assert_eq!(MathOperation::Subtract.check_arity(2), Ok(()));
        assert_eq!(
            MathOperation::Subtract.check_arity(3),
            Err(CombineError::SubtractArity { count: 3 })
        );
        assert_eq!(MathOperation::Sum.check_arity(0), Err(CombineError::NoSources));
    }

    #[test]
    fn test_evaluate_tracks_source_changes() {
        let a = MeasurementId::new();
        let b = MeasurementId::new();
        let mut store = HashMap::new();
        store.insert(a, flat(0.0, 1.0));
        store.insert(b, flat(0.0, 1.0));

        let trace = MathTrace::new("A+B", MathOperation::Sum, vec![a, b]);
        let first = trace.evaluate(&store);
        assert!(first.is_ok());
        assert_relative_eq!(first.measurement.mag_db[0], 6.0206, epsilon = 1e-3);

        store.insert(b, flat(-300.0, 1.0));
        let second = trace.evaluate(&store);
        assert_relative_eq!(second.measurement.mag_db[0], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_source_yields_sentinel() {
        let a = MeasurementId::new();
        let gone = MeasurementId::new();
        let mut store = HashMap::new();
        store.insert(a, flat(0.0, 1.0));

        let trace = MathTrace::new("A-B", MathOperation::Subtract, vec![a, gone]);
        let outcome = trace.evaluate(&store);
        assert!(outcome.measurement.is_empty());
        assert_eq!(outcome.error, Some(CombineError::MissingSource { id: gone }));
    }

    #[test]
    fn test_wrong_arity_checked_before_lookup() {
        let store: BTreeMap<MeasurementId, TransferFunction> = BTreeMap::new();
        let trace = MathTrace::new("bad", MathOperation::Subtract, vec![MeasurementId::new()]);
        let outcome = trace.evaluate(&store);
        assert_eq!(outcome.error, Some(CombineError::SubtractArity { count: 1 }));
        assert!(outcome.into_result().is_err());
    }

    #[test]
    fn test_depends_on() {
        let a = MeasurementId::new();
        let trace = MathTrace::new("avg", MathOperation::Average, vec![a]);
        assert!(trace.depends_on(&a));
        assert!(!trace.depends_on(&MeasurementId::new()));
    }

    #[test]
    fn test_trace_json_shape() {
        let trace = MathTrace::new("avg", MathOperation::Average, vec![]);
        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["operation"], "average");
        assert_eq!(json["name"], "avg");
    }
}
