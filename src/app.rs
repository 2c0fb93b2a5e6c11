//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs training and writes artifacts
//! - answers prediction requests (loaded or mock)
//! - prints reports / JSON

use std::fs::File;
use std::io::BufReader;

use chrono::{Local, NaiveDate};
use clap::Parser;
use serde::Serialize;

use crate::cli::{Command, ForecastArgs, OutputFormat, PredictArgs, SampleArgs, StatusArgs, TrainArgs};
use crate::domain::{SequenceRequest, TrainingConfig};
use crate::error::AppError;
use crate::io::ArtifactPaths;
use crate::report::RunContext;
use crate::service::{ForecastBaseline, InferenceService, mock_daily_forecast_from};

pub mod pipeline;

/// Entry point for the `wx` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Train(args) => handle_train(args),
        Command::Predict(args) => handle_predict(args),
        Command::Forecast(args) => handle_forecast(args),
        Command::Status(args) => handle_status(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_train(args: TrainArgs) -> Result<(), AppError> {
    let config = training_config_from_args(&args);
    let paths = ArtifactPaths::resolve(args.model_dir.as_deref());

    let run = pipeline::run_training(&args.data, &paths, &config)?;

    let ctx = RunContext {
        data_path: &args.data,
        rows_used: run.ingest.rows_used(),
        rows_skipped: run.ingest.row_errors.len(),
        model_dir: &run.paths.dir,
    };
    println!(
        "{}",
        crate::report::format_training_summary(&run.trained.report, &config, &ctx)
    );

    if let Some(path) = &args.export_history {
        crate::io::write_history_csv(path, &run.trained.report.history)?;
    }

    Ok(())
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let file = File::open(&args.input)
        .map_err(|e| AppError::new(2, format!("Failed to open request JSON '{}': {e}", args.input.display())))?;
    let request: SequenceRequest = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid request JSON: {e}")))?;

    let paths = ArtifactPaths::resolve(args.model_dir.as_deref());
    let service: InferenceService = InferenceService::load(&paths, args.seq_len);
    let response = service.predict(&request)?;

    print_json(&response)
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let baseline = match &args.history {
        Some(path) => ForecastBaseline::from_observations(&crate::io::load_observations(path)?.observations),
        None => ForecastBaseline::default(),
    };
    let start = args.start.unwrap_or_else(today);
    let days = mock_daily_forecast_from(&baseline, args.days, args.city_id, start)?;

    print_json(&days)
}

fn handle_status(args: StatusArgs) -> Result<(), AppError> {
    let paths = ArtifactPaths::resolve(args.model_dir.as_deref());
    let service: InferenceService = InferenceService::load(&paths, args.seq_len);
    let status = service.status();

    match args.format {
        OutputFormat::Json => print_json(&status),
        OutputFormat::Text => {
            print!("{}", crate::report::format_status(&status));
            Ok(())
        }
    }
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let start = today()
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| AppError::new(4, "Failed to build sample start time"))?;
    let observations = crate::data::generate_observations(args.rows, args.seed, start)?;
    crate::io::write_observations_csv(&args.output, &observations)?;
    eprintln!("wrote {} observations to {}", observations.len(), args.output.display());
    Ok(())
}

pub fn training_config_from_args(args: &TrainArgs) -> TrainingConfig {
    TrainingConfig {
        seq_len: args.seq_len,
        epochs: args.epochs,
        batch_size: args.batch_size,
        patience: args.patience,
        learning_rate: args.learning_rate,
        checkpoint_path: None,
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    let text =
        serde_json::to_string_pretty(value).map_err(|e| AppError::new(4, format!("Failed to encode JSON: {e}")))?;
    println!("{text}");
    Ok(())
}
