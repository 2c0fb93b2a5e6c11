//! Training orchestration.
//!
//! Responsibilities:
//!
//! - build the scaled, windowed train/validation dataset
//! - run the sequential epoch loop over a [`crate::models::SequenceModel`]
//! - checkpoint the best epoch, stop early, restore the best parameters

pub mod callbacks;
pub mod trainer;

pub use callbacks::*;
pub use trainer::*;
