//! Numerical utilities: reversible feature scaling and loss functions.

pub mod metrics;
pub mod scaler;

pub use metrics::*;
pub use scaler::*;
