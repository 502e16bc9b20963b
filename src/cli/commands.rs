//! CLI Command Implementations
//!
//! Each command reads its JSON inputs, runs one engine operation and writes
//! pretty-printed JSON to `out`.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use super::{Cli, Commands, GridArgs, TargetArg};
use crate::config::EngineConfig;
use crate::dsp::{
    apply_eq_to_measurement, eq_response_db, CustomTarget, FilterDescriptor, TargetCurve,
};
use crate::measurement::{combine_with, log_frequency_grid, MathOperation, TransferFunction};

/// One point of a printed curve
#[derive(Debug, Serialize)]
struct CurvePoint {
    freq_hz: f64,
    db: f64,
}

/// Run a parsed command line
pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let config = resolve_config(cli.config.as_deref(), cli.sample_rate)?;

    match cli.command {
        Commands::Response { filters, grid } => response(&filters, grid, &config, out),
        Commands::ApplyEq {
            measurement,
            filters,
        } => apply_eq(&measurement, &filters, &config, out),
        Commands::Combine { op, sources } => combine(op.into(), &sources, &config, out),
        Commands::Target { name, grid } => target(name, grid, &config, out),
    }
}

/// Load the configuration file (if any) and apply command-line overrides
pub fn resolve_config(path: Option<&Path>, sample_rate: Option<f64>) -> Result<EngineConfig> {
    let mut config = match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(sample_rate) = sample_rate {
        config.sample_rate = sample_rate;
        config.validate().context("Invalid --sample-rate")?;
    }
    Ok(config)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn grid_points(grid: GridArgs) -> Result<Vec<f64>> {
    log_frequency_grid(grid.start, grid.end, grid.points).context("Invalid --start/--end")
}

fn curve(freqs: &[f64], db: &[f64]) -> Vec<CurvePoint> {
    freqs
        .iter()
        .zip(db)
        .map(|(&freq_hz, &db)| CurvePoint { freq_hz, db })
        .collect()
}

/// Print the summed response of a filter list.
pub fn response(
    filters: &Path,
    grid: GridArgs,
    config: &EngineConfig,
    out: &mut dyn Write,
) -> Result<()> {
    info!("Evaluating filter response: {}", filters.display());

    let descriptors: Vec<FilterDescriptor> = read_json(filters)?;
    let freqs = grid_points(grid)?;
    let db = eq_response_db(&freqs, config.sample_rate, &descriptors)?;

    write_json(out, &curve(&freqs, &db))
}

/// Apply a filter list to a measurement.
pub fn apply_eq(
    measurement: &Path,
    filters: &Path,
    config: &EngineConfig,
    out: &mut dyn Write,
) -> Result<()> {
    info!("Applying EQ {} to {}", filters.display(), measurement.display());

    let source: TransferFunction = read_json(measurement)?;
    let descriptors: Vec<FilterDescriptor> = read_json(filters)?;
    let equalized = apply_eq_to_measurement(&source, config.sample_rate, &descriptors)?;

    write_json(out, &equalized)
}

/// Combine measurements into one derived measurement.
pub fn combine(
    operation: MathOperation,
    sources: &[impl AsRef<Path>],
    config: &EngineConfig,
    out: &mut dyn Write,
) -> Result<()> {
    info!("Combining {} measurements with {}", sources.len(), operation);

    let measurements = sources
        .iter()
        .map(|path| read_json::<TransferFunction>(path.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    let combined = combine_with(&measurements, operation, &config.combine)
        .with_context(|| format!("Cannot {} these measurements", operation))?;

    write_json(out, &combined)
}

/// Print a built-in target curve.
pub fn target(
    name: TargetArg,
    grid: GridArgs,
    config: &EngineConfig,
    out: &mut dyn Write,
) -> Result<()> {
    let target = match name {
        TargetArg::Flat => TargetCurve::Flat,
        TargetArg::Tilt => TargetCurve::Tilt(config.tilt),
        TargetArg::Custom => TargetCurve::Custom(CustomTarget::default()),
    };
    info!("Evaluating {} target", target.name());

    let freqs = grid_points(grid)?;
    let db = target.evaluate_curve(&freqs, config.sample_rate)?;

    write_json(out, &curve(&freqs, &db))
}
