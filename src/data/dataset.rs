//! Train/validation dataset construction.
//!
//! Order of operations matters:
//! 1) fit the scaler over the *full* raw array (unless one is supplied)
//! 2) scale the full array
//! 3) window the scaled array, so inputs and targets share one scale
//! 4) split windows at `floor(0.8 * window_count)`, preserving time order
//!
//! The fitted scaler travels with the dataset so it is always persisted next to
//! the model trained on it.

use std::ops::Range;

use crate::data::window::{ensure_enough, make_windows};
use crate::domain::{FeatureRow, Observation, TRAIN_FRACTION};
use crate::error::Result;
use crate::math::MinMaxScaler;

/// A contiguous, time-ordered slice of windows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Split {
    pub inputs: Vec<Vec<FeatureRow>>,
    pub targets: Vec<FeatureRow>,
    /// Window indices (= start observation indices) covered by this split.
    pub window_indices: Range<usize>,
}

impl Split {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub train: Split,
    pub validation: Split,
    pub scaler: MinMaxScaler,
    pub seq_len: usize,
}

impl Dataset {
    pub fn window_count(&self) -> usize {
        self.train.len() + self.validation.len()
    }
}

/// Number of windows that go to the training split.
pub fn train_split_len(window_count: usize) -> usize {
    (window_count as f64 * TRAIN_FRACTION).floor() as usize
}

/// Scale, window and split `observations`.
pub fn build_dataset(
    observations: &[Observation],
    seq_len: usize,
    scaler: Option<&MinMaxScaler>,
) -> Result<Dataset> {
    // Report the shortfall before anything else touches the data.
    ensure_enough(observations.len(), seq_len)?;

    let raw: Vec<FeatureRow> = observations.iter().map(Observation::features).collect();
    let scaler = match scaler {
        Some(s) => s.clone(),
        None => MinMaxScaler::fit(&raw)?,
    };
    let scaled = scaler.transform(&raw);

    let windows = make_windows(&scaled, seq_len)?;
    let count = windows.len();
    let cut = train_split_len(count);

    let mut inputs = windows.inputs;
    let mut targets = windows.targets;
    let val_inputs = inputs.split_off(cut);
    let val_targets = targets.split_off(cut);

    Ok(Dataset {
        train: Split {
            inputs,
            targets,
            window_indices: 0..cut,
        },
        validation: Split {
            inputs: val_inputs,
            targets: val_targets,
            window_indices: cut..count,
        },
        scaler,
        seq_len,
    })
}
