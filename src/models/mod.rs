//! Sequence models.
//!
//! The training controller and inference service only talk to models through
//! [`SequenceModel`], so any model that maps an `(L, 5)` window to a 5-vector and
//! can be trained batch by batch can be swapped in.

use crate::domain::FeatureRow;
use crate::error::{ForecastError, Result};
use crate::math::{Loss, loss};

pub mod linear;

pub use linear::*;

/// A trainable sequence-to-vector model over scaled feature rows.
pub trait SequenceModel {
    /// Snapshot of the trainable parameters (used for checkpointing).
    type Params: Clone;

    /// Short identifier written into artifacts and status output.
    fn kind(&self) -> &'static str;

    /// Window length the model was built for.
    fn seq_len(&self) -> usize;

    /// One gradient-descent step on a batch. Returns the batch MSE before the update.
    fn train_batch(&mut self, inputs: &[Vec<FeatureRow>], targets: &[FeatureRow]) -> Result<f64>;

    /// Predict the row that follows `input` (`seq_len` rows, oldest first).
    fn predict(&self, input: &[FeatureRow]) -> Result<FeatureRow>;

    fn params(&self) -> Self::Params;

    fn set_params(&mut self, params: Self::Params);

    /// One pass over the training data in order, in batches of `batch_size`.
    ///
    /// Returns the sample-weighted mean of the batch losses.
    fn train_epoch(
        &mut self,
        inputs: &[Vec<FeatureRow>],
        targets: &[FeatureRow],
        batch_size: usize,
    ) -> Result<f64> {
        if inputs.len() != targets.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "inputs ({}) and targets ({}) differ in length",
                inputs.len(),
                targets.len()
            )));
        }
        if inputs.is_empty() {
            return Err(ForecastError::EmptyTrainingSplit { windows: 0 });
        }
        let batch_size = batch_size.max(1);

        let mut total = 0.0;
        for (xb, yb) in inputs.chunks(batch_size).zip(targets.chunks(batch_size)) {
            total += self.train_batch(xb, yb)? * xb.len() as f64;
        }
        Ok(total / inputs.len() as f64)
    }

    fn predict_batch(&self, inputs: &[Vec<FeatureRow>]) -> Result<Vec<FeatureRow>> {
        inputs.iter().map(|x| self.predict(x)).collect()
    }

    /// MSE / MAE over a held-out split.
    fn evaluate(&self, inputs: &[Vec<FeatureRow>], targets: &[FeatureRow]) -> Result<Loss> {
        let predictions = self.predict_batch(inputs)?;
        Ok(loss(&predictions, targets))
    }
}
