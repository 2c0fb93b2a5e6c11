//! Observation arrays → model-ready datasets.
//!
//! - `window`: sliding `(input, target)` pairs over ordered rows
//! - `dataset`: scaling + windowing + time-ordered train/validation split
//! - `sample`: synthetic observations for demos

pub mod dataset;
pub mod sample;
pub mod window;

pub use dataset::{Dataset, Split, build_dataset, train_split_len};
pub use sample::generate_observations;
pub use window::{Windows, make_windows, required_observations};
