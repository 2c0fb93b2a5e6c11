//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - model + scaler artifacts (`artifact`)
//! - training history export (`export`)

pub mod artifact;
pub mod export;
pub mod ingest;

pub use artifact::*;
pub use export::*;
pub use ingest::*;
