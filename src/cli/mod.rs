//! CLI Module
//!
//! Command-line front end over JSON documents. Measurements, filter lists
//! and configuration are read from files; results are written as JSON.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::measurement::MathOperation;

/// Filter synthesis, frequency response and math traces for measurements
#[derive(Parser, Debug)]
#[command(name = "tfmath")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Engine configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured sample rate (Hz)
    #[arg(long, global = true)]
    pub sample_rate: Option<f64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the summed response of a filter list on a log grid
    #[command(name = "response")]
    Response {
        /// Filter list (JSON array of descriptors)
        filters: PathBuf,

        #[command(flatten)]
        grid: GridArgs,
    },

    /// Apply a filter list to a measurement's magnitude
    #[command(name = "apply-eq")]
    ApplyEq {
        /// Measurement (JSON)
        measurement: PathBuf,

        /// Filter list (JSON array of descriptors)
        #[arg(short, long)]
        filters: PathBuf,
    },

    /// Combine measurements into a math trace
    #[command(name = "combine")]
    Combine {
        /// Combination to perform
        #[arg(short, long, value_enum)]
        op: OperationArg,

        /// Source measurements (JSON), in order
        #[arg(required = true)]
        sources: Vec<PathBuf>,
    },

    /// Print a built-in target curve on a log grid
    #[command(name = "target")]
    Target {
        /// Which target
        #[arg(value_enum)]
        name: TargetArg,

        #[command(flatten)]
        grid: GridArgs,
    },
}

/// Log-spaced output grid
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct GridArgs {
    /// Lowest frequency (Hz)
    #[arg(long, default_value_t = 20.0)]
    pub start: f64,

    /// Highest frequency (Hz)
    #[arg(long, default_value_t = 20_000.0)]
    pub end: f64,

    /// Number of points
    #[arg(long, default_value_t = 200)]
    pub points: usize,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationArg {
    Sum,
    Average,
    Subtract,
}

impl From<OperationArg> for MathOperation {
    fn from(op: OperationArg) -> Self {
        match op {
            OperationArg::Sum => MathOperation::Sum,
            OperationArg::Average => MathOperation::Average,
            OperationArg::Subtract => MathOperation::Subtract,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetArg {
    Flat,
    Tilt,
    Custom,
}
