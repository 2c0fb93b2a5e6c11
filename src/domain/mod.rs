//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the observation shape and feature order (`Observation`, `Feature`, `FeatureRow`)
//! - inference request/response records (`SequenceRequest`, `PredictionResponse`)
//! - training configuration and outcomes (`TrainingConfig`, `TrainingReport`)

pub mod types;

pub use types::*;
