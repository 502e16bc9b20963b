//! Integration Tests
//!
//! End-to-end tests for filter synthesis, EQ curves and math traces.

use std::collections::HashMap;

use approx::assert_abs_diff_eq;
use pretty_assertions::assert_eq;

use tfmath::dsp::{
    apply_eq, eq_response_db, evaluate_magnitude_db, synthesize, DevicePreset, FilterDescriptor,
    FilterType, HfcPosition, ParametricFilter, PresetKind, PresetSetting,
};
use tfmath::measurement::{log_frequency_grid, MeasurementId};
use tfmath::{
    combine, combine_or_empty, CombineError, MathOperation, MathTrace, TargetCurve,
    TransferFunction,
};

const SAMPLE_RATE: f64 = 48000.0;

/// Helper to create a flat measurement on a shared grid
fn flat_measurement(
    freqs: &[f64],
    mag_db: f64,
    phase_deg: f64,
    coherence: f64,
) -> TransferFunction {
    TransferFunction::new(
        freqs.to_vec(),
        vec![mag_db; freqs.len()],
        vec![phase_deg; freqs.len()],
        vec![coherence; freqs.len()],
    )
}

fn all_presets() -> Vec<DevicePreset> {
    vec![
        DevicePreset::new(PresetSetting::HumanVoice { gain_db: 3.0 }),
        DevicePreset::new(PresetSetting::Cpl { gain_db: -4.0 }),
        DevicePreset::new(PresetSetting::Hfc {
            position: HfcPosition::Hfc1,
        }),
        DevicePreset::new(PresetSetting::Hfc {
            position: HfcPosition::Hfc2,
        }),
        DevicePreset::new(PresetSetting::Asc { gain_db: 2.0 }),
        DevicePreset::new(PresetSetting::HfThrow { gain_db: 1.5 }),
        DevicePreset::new(PresetSetting::AirCompensation { gain_db: 2.5 }),
        DevicePreset::new(PresetSetting::LowBoost { gain_db: 6.0 }),
        DevicePreset::new(PresetSetting::Subsonic { gain_db: -12.0 }),
        DevicePreset::new(PresetSetting::HfShelf { gain_db: -2.0 }),
    ]
}

// === Filter Synthesis ===

#[test]
fn test_every_descriptor_is_normalized() {
    let mut descriptors: Vec<FilterDescriptor> = vec![
        ParametricFilter::peaking(1000.0, 6.0, 2.0).into(),
        ParametricFilter::low_shelf(200.0, -3.0).into(),
        ParametricFilter::high_shelf(5000.0, 4.0).with_shelf_slope(0.5).into(),
        ParametricFilter::low_pass(8000.0, 0.707).into(),
        ParametricFilter::high_pass(40.0, 0.5).with_slope(24.0).into(),
    ];
    descriptors.extend(all_presets().into_iter().map(FilterDescriptor::from));

    for descriptor in &descriptors {
        let section = synthesize(descriptor, SAMPLE_RATE).unwrap();
        assert_eq!(section.a0, 1.0, "a0 not normalized for {:?}", descriptor);
        assert!(section.b0.is_finite() && section.a1.is_finite() && section.a2.is_finite());
    }
}

#[test]
fn test_every_preset_kind_has_a_mapping() {
    let presets = all_presets();
    for kind in PresetKind::ALL {
        assert!(
            presets.iter().any(|p| p.kind() == kind),
            "missing preset fixture for {}",
            kind.name()
        );
    }
}

#[test]
fn test_peak_boost_at_center() {
    let peak: FilterDescriptor = ParametricFilter::peaking(1000.0, 6.0, 1.0).into();
    let section = synthesize(&peak, SAMPLE_RATE).unwrap();
    let db = evaluate_magnitude_db(&[section], SAMPLE_RATE, &[1000.0]);
    assert_abs_diff_eq!(db[0], 6.0, epsilon = 0.01);
}

#[test]
fn test_neutral_filters_are_flat() {
    let freqs = log_frequency_grid(20.0, 20000.0, 64).unwrap();
    let descriptors: Vec<FilterDescriptor> = vec![
        ParametricFilter::peaking(1000.0, 0.0, 4.0).into(),
        ParametricFilter::low_shelf(100.0, 0.0).into(),
        ParametricFilter::high_shelf(8000.0, 0.0).into(),
    ];

    let db = eq_response_db(&freqs, SAMPLE_RATE, &descriptors).unwrap();
    for value in db {
        assert_abs_diff_eq!(value, 0.0, epsilon = 1e-9);
    }
}

#[test]
fn test_preset_from_json() {
    let json = r#"[{"preset": {"kind": "hfc", "position": "hfc2"}}]"#;
    let descriptors: Vec<FilterDescriptor> = serde_json::from_str(json).unwrap();

    assert!(descriptors[0].is_enabled());
    let db = eq_response_db(&[24000.0], SAMPLE_RATE, &descriptors).unwrap();
    assert_abs_diff_eq!(db[0], -6.0, epsilon = 0.01);
}

#[test]
fn test_parametric_from_json_defaults() {
    let json = r#"{
        "parametric": {"filter_type": "high_pass", "frequency": 80.0, "slope_db_per_octave": 48.0}
    }"#;
    let descriptor: FilterDescriptor = serde_json::from_str(json).unwrap();

    match &descriptor {
        FilterDescriptor::Parametric(filter) => {
            assert_eq!(filter.filter_type, FilterType::HighPass);
            assert!(filter.enabled);
        }
        other => panic!("expected parametric band, got {:?}", other),
    }
    assert_eq!(descriptor.section_count(), 4);
}

// === EQ Application ===

#[test]
fn test_eq_is_order_independent() {
    let freqs = log_frequency_grid(20.0, 20000.0, 100).unwrap();
    let base = vec![-3.0; freqs.len()];
    let a: FilterDescriptor = ParametricFilter::peaking(250.0, -4.0, 2.0).into();
    let b: FilterDescriptor = ParametricFilter::high_pass(60.0, 0.707).with_slope(24.0).into();
    let c: FilterDescriptor =
        DevicePreset::new(PresetSetting::AirCompensation { gain_db: 3.0 }).into();

    let forward = apply_eq(&base, &freqs, SAMPLE_RATE, &[a.clone(), b.clone(), c.clone()]).unwrap();
    let reverse = apply_eq(&base, &freqs, SAMPLE_RATE, &[c, a, b]).unwrap();

    for (x, y) in forward.iter().zip(&reverse) {
        assert_abs_diff_eq!(*x, *y, epsilon = 1e-9);
    }
}

#[test]
fn test_pass_slope_scales_attenuation() {
    let freqs = [100.0, 1000.0, 4000.0];
    let base = vec![0.0; freqs.len()];
    let slope_12: FilterDescriptor = ParametricFilter::low_pass(500.0, 0.707).into();
    let slope_24: FilterDescriptor =
        ParametricFilter::low_pass(500.0, 0.707).with_slope(24.0).into();

    let single = apply_eq(&base, &freqs, SAMPLE_RATE, &[slope_12]).unwrap();
    let double = apply_eq(&base, &freqs, SAMPLE_RATE, &[slope_24]).unwrap();

    for (s, d) in single.iter().zip(&double) {
        assert_abs_diff_eq!(*d, 2.0 * s, epsilon = 1e-9);
    }
}

#[test]
fn test_disabled_filters_do_not_contribute() {
    let freqs = [1000.0];
    let base = [1.5];
    let filters: Vec<FilterDescriptor> =
        vec![ParametricFilter::peaking(1000.0, 12.0, 1.0).disabled().into()];

    assert_eq!(apply_eq(&base, &freqs, SAMPLE_RATE, &filters).unwrap(), vec![1.5]);
}

// === Math Traces ===

#[test]
fn test_single_source_sum_is_identity() {
    let freqs = log_frequency_grid(20.0, 20000.0, 16).unwrap();
    let source = TransferFunction::new(
        freqs.clone(),
        (0..freqs.len()).map(|i| i as f64 - 8.0).collect(),
        vec![190.0; freqs.len()],
        vec![0.8; freqs.len()],
    );

    let result = combine(&[source.clone()], MathOperation::Sum).unwrap();
    assert_eq!(result.freqs, source.freqs);
    assert_eq!(result.mag_db, source.mag_db);
    assert_eq!(result.coherence, source.coherence);
    for phase in &result.phase_deg {
        assert_abs_diff_eq!(*phase, -170.0, epsilon = 1e-9);
    }
    assert!(result.impulse_response.is_empty());
}

#[test]
fn test_combined_phase_is_wrapped() {
    let freqs = log_frequency_grid(100.0, 1000.0, 8).unwrap();
    let a = flat_measurement(&freqs, 0.0, 170.0, 1.0);
    let b = flat_measurement(&freqs, 0.0, 175.0, 1.0);

    for op in [MathOperation::Sum, MathOperation::Average, MathOperation::Subtract] {
        let result = combine(&[a.clone(), b.clone()], op).unwrap();
        for phase in &result.phase_deg {
            assert!(*phase > -180.0 && *phase <= 180.0, "{} phase {} out of range", op, phase);
        }
    }
}

#[test]
fn test_average_coherence_stays_in_bounds() {
    let freqs = log_frequency_grid(20.0, 20000.0, 32).unwrap();
    let a = flat_measurement(&freqs, -3.0, 10.0, 0.05);
    let b = flat_measurement(&freqs, 2.0, -40.0, 0.9);
    let c = flat_measurement(&freqs, 0.0, 120.0, 1.0);

    let result = combine(&[a, b, c], MathOperation::Average).unwrap();
    for coherence in &result.coherence {
        assert!((0.0..=1.0).contains(coherence));
    }
}

#[test]
fn test_average_of_identical_sources() {
    let freqs = log_frequency_grid(20.0, 20000.0, 32).unwrap();
    let source = flat_measurement(&freqs, -7.5, 45.0, 0.6);

    let sources = vec![source; 3];
    let result = combine(&sources, MathOperation::Average).unwrap();
    for i in 0..freqs.len() {
        assert_abs_diff_eq!(result.mag_db[i], -7.5, epsilon = 1e-9);
        assert_abs_diff_eq!(result.phase_deg[i], 45.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.coherence[i], 0.6, epsilon = 1e-12);
    }
}

#[test]
fn test_destructive_sum_reaches_floor() {
    let freqs = [100.0, 1000.0];
    let a = flat_measurement(&freqs, 0.0, 0.0, 1.0);
    let b = flat_measurement(&freqs, 0.0, 180.0, 1.0);

    let result = combine(&[a, b], MathOperation::Sum).unwrap();
    assert_eq!(result.mag_db, vec![-200.0, -200.0]);
    assert_eq!(result.phase_deg, vec![0.0, 0.0]);
}

#[test]
fn test_subtract_requires_two_sources() {
    let freqs = [100.0];
    let a = flat_measurement(&freqs, 0.0, 0.0, 1.0);

    for sources in [vec![a.clone()], vec![a.clone(), a.clone(), a.clone()]] {
        let outcome = combine_or_empty(&sources, MathOperation::Subtract);
        assert!(outcome.measurement.is_empty());
        assert_eq!(
            outcome.error,
            Some(CombineError::SubtractArity { count: sources.len() })
        );
    }
}

#[test]
fn test_grid_mismatch_is_rejected() {
    let a = flat_measurement(&[100.0, 200.0], 0.0, 0.0, 1.0);
    let b = flat_measurement(&[100.0, 201.0], 0.0, 0.0, 1.0);

    let outcome = combine_or_empty(&[a, b], MathOperation::Average);
    assert!(outcome.measurement.is_empty());
    assert!(matches!(
        outcome.error,
        Some(CombineError::GridValueMismatch { source_index: 1, bin: 1, .. })
    ));
}

#[test]
fn test_math_trace_over_store() {
    let freqs = log_frequency_grid(20.0, 20000.0, 8).unwrap();
    let left = MeasurementId::new();
    let right = MeasurementId::new();
    let mut store = HashMap::new();
    store.insert(left, flat_measurement(&freqs, 0.0, 0.0, 1.0));
    store.insert(right, flat_measurement(&freqs, 0.0, 0.0, 1.0));

    let trace = MathTrace::new("L+R", MathOperation::Sum, vec![left, right]);
    let outcome = trace.evaluate(&store);
    assert!(outcome.is_ok());
    for db in &outcome.measurement.mag_db {
        assert_abs_diff_eq!(*db, 20.0 * 2f64.log10(), epsilon = 1e-9);
    }

    let missing = MeasurementId::new();
    let broken = MathTrace::new("L-?", MathOperation::Subtract, vec![left, missing]);
    let outcome = broken.evaluate(&store);
    assert!(outcome.measurement.is_empty());
    assert_eq!(outcome.error, Some(CombineError::MissingSource { id: missing }));
}

// === Targets ===

#[test]
fn test_target_curves_on_grid() {
    let freqs = log_frequency_grid(20.0, 20000.0, 50).unwrap();

    let flat = TargetCurve::Flat.evaluate_curve(&freqs, SAMPLE_RATE).unwrap();
    assert!(flat.iter().all(|&db| db == 0.0));

    let house = TargetCurve::Custom(Default::default())
        .evaluate_curve(&freqs, SAMPLE_RATE)
        .unwrap();
    assert!(house[0] > house[freqs.len() - 1]);
}
