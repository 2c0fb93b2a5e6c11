//! Error types.
//!
//! Two layers:
//! - [`ForecastError`] is what the pipeline itself raises (windowing, scaling,
//!   training, inference). Variants carry enough context to diagnose a failure
//!   without reproducing it.
//! - [`AppError`] is the CLI-level error: a message plus a process exit code.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the forecasting pipeline.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Fewer observations than one window + target requires.
    #[error("Not enough data: need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Malformed inference request (client error).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Model or scaler artifact missing or corrupt.
    #[error("Failed to load artifact '{}': {reason}", path.display())]
    ArtifactLoad { path: PathBuf, reason: String },

    /// The 80/20 split left no windows to train on.
    #[error("Training split is empty: {windows} window(s) available, need at least 2")]
    EmptyTrainingSplit { windows: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Unreadable or malformed input file.
    #[error("{0}")]
    Input(String),

    /// Input parsed, but nothing usable was left.
    #[error("No data: {0}")]
    NoData(String),

    /// Non-finite values where finite ones are required.
    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ForecastError {
    /// True for request-shape problems the caller can fix (4xx-equivalent).
    pub fn is_client_error(&self) -> bool {
        matches!(self, ForecastError::Validation(_))
    }
}

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        let exit_code = match &err {
            ForecastError::Validation(_) | ForecastError::InvalidParameter(_) | ForecastError::Input(_) => 2,
            ForecastError::Io(_) | ForecastError::Csv(_) | ForecastError::Json(_) => 2,
            ForecastError::InsufficientData { .. }
            | ForecastError::EmptyTrainingSplit { .. }
            | ForecastError::NoData(_) => 3,
            ForecastError::ArtifactLoad { .. } | ForecastError::Numerical(_) => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}
