//! Sliding windows over an ordered observation array.
//!
//! For `N` rows and window length `L` there are exactly `N - L` windows:
//! window `i` covers rows `[i, i + L)` and its target is row `i + L`.

use crate::domain::FeatureRow;
use crate::error::{ForecastError, Result};

/// Model inputs and their next-step targets, in start-index order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Windows {
    /// Each entry has exactly `L` rows.
    pub inputs: Vec<Vec<FeatureRow>>,
    pub targets: Vec<FeatureRow>,
}

impl Windows {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Minimum number of rows needed to form one window plus its target.
pub fn required_observations(seq_len: usize) -> usize {
    seq_len + 1
}

/// Check the `N >= L + 1` precondition.
pub fn ensure_enough(actual: usize, seq_len: usize) -> Result<()> {
    let required = required_observations(seq_len);
    if actual < required {
        return Err(ForecastError::InsufficientData { required, actual });
    }
    Ok(())
}

/// Cut `rows` into `(input, target)` pairs of length `seq_len`.
pub fn make_windows(rows: &[FeatureRow], seq_len: usize) -> Result<Windows> {
    if seq_len == 0 {
        return Err(ForecastError::InvalidParameter(
            "window length must be > 0".to_string(),
        ));
    }
    ensure_enough(rows.len(), seq_len)?;

    let count = rows.len() - seq_len;
    let mut inputs = Vec::with_capacity(count);
    let mut targets = Vec::with_capacity(count);
    for (i, window) in rows.windows(seq_len).take(count).enumerate() {
        inputs.push(window.to_vec());
        targets.push(rows[i + seq_len]);
    }

    Ok(Windows { inputs, targets })
}
