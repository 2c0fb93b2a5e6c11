//! Command-line parsing for the weather sequence forecaster.
//!
//! The goal of this module is to keep **argument parsing** separate from
//! training and inference code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::{BATCH_SIZE, EPOCHS, LEARNING_RATE, PATIENCE, SEQ_LEN};
use crate::service::DEFAULT_FORECAST_DAYS;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "wx", version, about = "Weather sequence forecaster (train, predict, mock forecasts)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Train the sequence model on a CSV of hourly observations and save artifacts.
    Train(TrainArgs),
    /// Predict the next reading from a JSON request of five feature arrays.
    Predict(PredictArgs),
    /// Print a synthetic multi-day forecast (not model-backed).
    Forecast(ForecastArgs),
    /// Show whether the service would run with a loaded model or in mock mode.
    Status(StatusArgs),
    /// Write a synthetic hourly observation CSV for demos.
    Sample(SampleArgs),
}

/// Options for training.
#[derive(Debug, Parser, Clone)]
pub struct TrainArgs {
    /// Observation CSV (`timestamp,temperature,humidity,pressure[,wind_speed][,rainfall]`).
    #[arg(long, value_name = "CSV")]
    pub data: PathBuf,

    /// Artifact directory (defaults to `$WEATHER_MODEL_DIR`, then `./model`).
    #[arg(long, value_name = "DIR")]
    pub model_dir: Option<PathBuf>,

    /// Observations per input window.
    #[arg(long, default_value_t = SEQ_LEN)]
    pub seq_len: usize,

    #[arg(long, default_value_t = EPOCHS)]
    pub epochs: usize,

    #[arg(long, default_value_t = BATCH_SIZE)]
    pub batch_size: usize,

    /// Epochs without validation improvement before stopping.
    #[arg(long, default_value_t = PATIENCE)]
    pub patience: usize,

    #[arg(long, default_value_t = LEARNING_RATE)]
    pub learning_rate: f64,

    /// Also write per-epoch losses to CSV.
    #[arg(long, value_name = "CSV")]
    pub export_history: Option<PathBuf>,
}

/// Options for single-sequence inference.
#[derive(Debug, Parser, Clone)]
pub struct PredictArgs {
    /// Request JSON: `{"temperature": [...], "humidity": [...], ...}`.
    #[arg(long, value_name = "JSON")]
    pub input: PathBuf,

    #[arg(long, value_name = "DIR")]
    pub model_dir: Option<PathBuf>,

    /// Window length the service expects.
    #[arg(long, default_value_t = SEQ_LEN)]
    pub seq_len: usize,
}

/// Options for the synthetic multi-day forecast.
#[derive(Debug, Parser, Clone)]
pub struct ForecastArgs {
    #[arg(long, default_value_t = DEFAULT_FORECAST_DAYS)]
    pub days: u32,

    #[arg(long, default_value_t = 1)]
    pub city_id: u32,

    /// Day before the first forecast day (defaults to today).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub start: Option<NaiveDate>,

    /// Centre the forecast on the means of this observation CSV.
    #[arg(long, value_name = "CSV")]
    pub history: Option<PathBuf>,
}

/// Options for the status report.
#[derive(Debug, Parser, Clone)]
pub struct StatusArgs {
    #[arg(long, value_name = "DIR")]
    pub model_dir: Option<PathBuf>,

    #[arg(long, default_value_t = SEQ_LEN)]
    pub seq_len: usize,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

/// Options for synthetic data generation.
#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    #[arg(long, value_name = "CSV")]
    pub output: PathBuf,

    #[arg(long, default_value_t = 240)]
    pub rows: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
