//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during windowing and training
//! - written to / read from JSON artifacts and CLI requests
//! - exported to CSV

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// Number of features per observation.
pub const FEATURE_COUNT: usize = 5;

/// Default window length (observations per input sequence).
pub const SEQ_LEN: usize = 24;
pub const EPOCHS: usize = 50;
pub const BATCH_SIZE: usize = 32;
/// Epochs without validation improvement before training stops.
pub const PATIENCE: usize = 10;
pub const LEARNING_RATE: f64 = 0.5;

/// Fraction of windows (not observations) assigned to the training split.
pub const TRAIN_FRACTION: f64 = 0.8;

/// Backfill value when the source has no wind speed.
pub const DEFAULT_WIND_SPEED: f64 = 5.0;
/// Backfill value when the source has no rainfall.
pub const DEFAULT_RAINFALL: f64 = 0.0;

/// Decimal places used when presenting predictions.
pub const PREDICTION_DECIMALS: i32 = 2;

/// One row of the five features, in canonical order.
pub type FeatureRow = [f64; FEATURE_COUNT];

/// The five forecast quantities, in the fixed column order used everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Temperature,
    Humidity,
    Pressure,
    WindSpeed,
    Rainfall,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Temperature,
        Feature::Humidity,
        Feature::Pressure,
        Feature::WindSpeed,
        Feature::Rainfall,
    ];

    /// Column index in a [`FeatureRow`].
    pub fn index(self) -> usize {
        match self {
            Feature::Temperature => 0,
            Feature::Humidity => 1,
            Feature::Pressure => 2,
            Feature::WindSpeed => 3,
            Feature::Rainfall => 4,
        }
    }

    /// Field / column name used in CSV headers and JSON payloads.
    pub fn name(self) -> &'static str {
        match self {
            Feature::Temperature => "temperature",
            Feature::Humidity => "humidity",
            Feature::Pressure => "pressure",
            Feature::WindSpeed => "wind_speed",
            Feature::Rainfall => "rainfall",
        }
    }
}

/// A single timestamped weather reading.
///
/// The timestamp only orders observations; windowing never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub rainfall: f64,
}

impl Observation {
    pub fn new(timestamp: NaiveDateTime, features: FeatureRow) -> Self {
        Self {
            timestamp,
            temperature: features[0],
            humidity: features[1],
            pressure: features[2],
            wind_speed: features[3],
            rainfall: features[4],
        }
    }

    /// Feature values in canonical order.
    pub fn features(&self) -> FeatureRow {
        [
            self.temperature,
            self.humidity,
            self.pressure,
            self.wind_speed,
            self.rainfall,
        ]
    }
}

/// A next-step forecast of the five quantities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherPrediction {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub rainfall: f64,
}

impl WeatherPrediction {
    pub fn from_row(row: FeatureRow) -> Self {
        Self {
            temperature: row[0],
            humidity: row[1],
            pressure: row[2],
            wind_speed: row[3],
            rainfall: row[4],
        }
    }

    /// Round every field to `decimals` places.
    ///
    /// Values too large to scale are already whole and are kept as is.
    pub fn rounded(&self, decimals: i32) -> Self {
        let scale = 10f64.powi(decimals);
        let round = |v: f64| {
            let scaled = v * scale;
            if scaled.is_finite() { scaled.round() / scale } else { v }
        };
        Self {
            temperature: round(self.temperature),
            humidity: round(self.humidity),
            pressure: round(self.pressure),
            wind_speed: round(self.wind_speed),
            rainfall: round(self.rainfall),
        }
    }

    pub fn is_finite(&self) -> bool {
        [
            self.temperature,
            self.humidity,
            self.pressure,
            self.wind_speed,
            self.rainfall,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Inbound inference request: one array per feature, aligned by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceRequest {
    pub temperature: Vec<f64>,
    pub humidity: Vec<f64>,
    pub pressure: Vec<f64>,
    pub wind_speed: Vec<f64>,
    pub rainfall: Vec<f64>,
}

impl SequenceRequest {
    /// Build a request from rows (oldest first).
    pub fn from_rows(rows: &[FeatureRow]) -> Self {
        let column = |idx: usize| rows.iter().map(|r| r[idx]).collect();
        Self {
            temperature: column(0),
            humidity: column(1),
            pressure: column(2),
            wind_speed: column(3),
            rainfall: column(4),
        }
    }

    /// Feature arrays paired with their names, in canonical order.
    pub fn columns(&self) -> [(Feature, &[f64]); FEATURE_COUNT] {
        [
            (Feature::Temperature, self.temperature.as_slice()),
            (Feature::Humidity, self.humidity.as_slice()),
            (Feature::Pressure, self.pressure.as_slice()),
            (Feature::WindSpeed, self.wind_speed.as_slice()),
            (Feature::Rainfall, self.rainfall.as_slice()),
        ]
    }
}

/// Which backend answered a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceMode {
    /// Model and scaler artifacts are loaded.
    Loaded,
    /// Artifacts unavailable; fixed placeholder responses.
    Mock,
}

impl ServiceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceMode::Loaded => "loaded",
            ServiceMode::Mock => "mock",
        }
    }
}

/// Inference response: the prediction plus the mode that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub model_status: ServiceMode,
    #[serde(flatten)]
    pub prediction: WeatherPrediction,
}

/// One day of the synthetic multi-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub predicted_temperature: f64,
    pub predicted_humidity: f64,
    pub predicted_pressure: f64,
    pub predicted_rainfall: f64,
    pub confidence: f64,
    pub city_id: u32,
}

/// Metadata about the loaded model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub kind: String,
    pub seq_len: usize,
    pub features: usize,
}

/// Health / metadata snapshot of an inference service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub model_status: ServiceMode,
    pub seq_len: usize,
    pub model: Option<ModelInfo>,
    pub fallback_reason: Option<String>,
}

/// Training hyper-parameters.
///
/// Defaults mirror the fixed constants of the training entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub seq_len: usize,
    pub epochs: usize,
    pub batch_size: usize,
    pub patience: usize,
    pub learning_rate: f64,
    /// When set, every new best checkpoint is also written here.
    pub checkpoint_path: Option<PathBuf>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seq_len: SEQ_LEN,
            epochs: EPOCHS,
            batch_size: BATCH_SIZE,
            patience: PATIENCE,
            learning_rate: LEARNING_RATE,
            checkpoint_path: None,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.seq_len == 0 {
            return Err(ForecastError::InvalidParameter("seq_len must be > 0".to_string()));
        }
        if self.epochs == 0 {
            return Err(ForecastError::InvalidParameter("epochs must be > 0".to_string()));
        }
        if self.batch_size == 0 {
            return Err(ForecastError::InvalidParameter("batch_size must be > 0".to_string()));
        }
        if self.patience == 0 {
            return Err(ForecastError::InvalidParameter("patience must be > 0".to_string()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "learning_rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

/// How a training run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    /// Ran every configured epoch.
    Completed,
    /// Patience exhausted before the last epoch.
    StoppedEarly,
}

/// Losses recorded at the end of one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// 1-based epoch number.
    pub epoch: usize,
    pub train_loss: f64,
    pub val_loss: f64,
    pub val_mae: f64,
}

/// Outcome of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub status: TrainingStatus,
    pub epochs_run: usize,
    pub best_epoch: usize,
    pub best_val_loss: f64,
    pub train_windows: usize,
    pub val_windows: usize,
    pub history: Vec<EpochMetrics>,
}

impl TrainingReport {
    pub fn final_metrics(&self) -> Option<&EpochMetrics> {
        self.history.last()
    }
}
