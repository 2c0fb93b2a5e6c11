//! `weather-forecast` library crate.
//!
//! Hourly weather observations (temperature, humidity, pressure, wind speed,
//! rainfall) are scaled, cut into fixed-length windows and used to train a
//! sequence-to-vector model that predicts the next reading. A trained model is
//! served by [`service::InferenceService`], which falls back to placeholder
//! responses when no artifacts are available.
//!
//! The binary (`wx`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the training and inference pieces are reusable from other front-ends

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
pub mod service;
