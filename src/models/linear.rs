//! Residual linear sequence model.
//!
//! Prediction for a window `X` (`L` rows of 5 scaled features):
//!
//! ```text
//! ŷ = x_last + W · vec(X) + b
//! ```
//!
//! where `x_last` is the final row of the window, `W` is `5 × 5L` and `b` has 5
//! entries. Parameters start at zero, so an untrained model is the persistence
//! forecast and training learns the correction on top of it.
//!
//! Training is mini-batch gradient descent on MSE with a normalized step:
//! the batch-mean gradient is scaled by `lr / (1 + mean ‖vec(X)‖²)`. The input
//! dimension grows with `L`, and this keeps the step stable for any `lr` in
//! `(0, 2)` without retuning.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::domain::{FEATURE_COUNT, FeatureRow, LEARNING_RATE};
use crate::error::{ForecastError, Result};
use crate::models::SequenceModel;

pub const LINEAR_MODEL_KIND: &str = "residual-linear";

/// Trainable parameters of [`LinearSequenceModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct LinearParams {
    pub weights: DMatrix<f64>,
    pub bias: DVector<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "LinearModelFile", try_from = "LinearModelFile")]
pub struct LinearSequenceModel {
    seq_len: usize,
    learning_rate: f64,
    weights: DMatrix<f64>,
    bias: DVector<f64>,
}

impl LinearSequenceModel {
    pub fn new(seq_len: usize, learning_rate: f64) -> Result<Self> {
        if seq_len == 0 {
            return Err(ForecastError::InvalidParameter("seq_len must be > 0".to_string()));
        }
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "learning_rate must be a positive number, got {learning_rate}"
            )));
        }
        Ok(Self {
            seq_len,
            learning_rate,
            weights: DMatrix::zeros(FEATURE_COUNT, seq_len * FEATURE_COUNT),
            bias: DVector::zeros(FEATURE_COUNT),
        })
    }

    pub fn with_default_rate(seq_len: usize) -> Result<Self> {
        Self::new(seq_len, LEARNING_RATE)
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    fn input_len(&self) -> usize {
        self.seq_len * FEATURE_COUNT
    }

    fn flatten(&self, input: &[FeatureRow]) -> Result<DVector<f64>> {
        if input.len() != self.seq_len {
            return Err(ForecastError::InvalidParameter(format!(
                "model expects {} rows per window, got {}",
                self.seq_len,
                input.len()
            )));
        }
        Ok(DVector::from_iterator(
            self.input_len(),
            input.iter().flat_map(|row| row.iter().copied()),
        ))
    }

    fn forward(&self, x: &DVector<f64>, last: &FeatureRow) -> DVector<f64> {
        let mut out = &self.weights * x;
        out += &self.bias;
        for (i, v) in last.iter().enumerate() {
            out[i] += v;
        }
        out
    }
}

impl SequenceModel for LinearSequenceModel {
    type Params = LinearParams;

    fn kind(&self) -> &'static str {
        LINEAR_MODEL_KIND
    }

    fn seq_len(&self) -> usize {
        self.seq_len
    }

    fn train_batch(&mut self, inputs: &[Vec<FeatureRow>], targets: &[FeatureRow]) -> Result<f64> {
        if inputs.is_empty() || inputs.len() != targets.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "batch needs matching non-empty inputs/targets, got {}/{}",
                inputs.len(),
                targets.len()
            )));
        }

        let n = inputs.len() as f64;
        let mut grad_w = DMatrix::<f64>::zeros(FEATURE_COUNT, self.input_len());
        let mut grad_b = DVector::<f64>::zeros(FEATURE_COUNT);
        let mut sq_input = 0.0;
        let mut sq_err = 0.0;

        for (input, target) in inputs.iter().zip(targets) {
            let x = self.flatten(input)?;
            let last = input[self.seq_len - 1];
            let err = self.forward(&x, &last) - DVector::from_row_slice(target);

            sq_err += err.norm_squared();
            sq_input += x.norm_squared();
            grad_w.ger(1.0, &err, &x, 1.0);
            grad_b += &err;
        }

        let step = self.learning_rate / (1.0 + sq_input / n) / n;
        self.weights -= grad_w * step;
        self.bias -= grad_b * step;

        if self.weights.iter().chain(self.bias.iter()).any(|v| !v.is_finite()) {
            return Err(ForecastError::Numerical(
                "parameters diverged to non-finite values".to_string(),
            ));
        }

        Ok(sq_err / (n * FEATURE_COUNT as f64))
    }

    fn predict(&self, input: &[FeatureRow]) -> Result<FeatureRow> {
        let x = self.flatten(input)?;
        let y = self.forward(&x, &input[self.seq_len - 1]);
        let mut out = [0.0; FEATURE_COUNT];
        for (o, v) in out.iter_mut().zip(y.iter()) {
            *o = *v;
        }
        Ok(out)
    }

    fn params(&self) -> LinearParams {
        LinearParams {
            weights: self.weights.clone(),
            bias: self.bias.clone(),
        }
    }

    fn set_params(&mut self, params: LinearParams) {
        self.weights = params.weights;
        self.bias = params.bias;
    }
}

/// On-disk representation (row-major weights).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModelFile {
    pub kind: String,
    pub seq_len: usize,
    pub features: usize,
    pub learning_rate: f64,
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

impl From<LinearSequenceModel> for LinearModelFile {
    fn from(model: LinearSequenceModel) -> Self {
        let weights = model
            .weights
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect();
        Self {
            kind: LINEAR_MODEL_KIND.to_string(),
            seq_len: model.seq_len,
            features: FEATURE_COUNT,
            learning_rate: model.learning_rate,
            weights,
            bias: model.bias.iter().copied().collect(),
        }
    }
}

impl TryFrom<LinearModelFile> for LinearSequenceModel {
    type Error = String;

    fn try_from(file: LinearModelFile) -> std::result::Result<Self, Self::Error> {
        if file.kind != LINEAR_MODEL_KIND {
            return Err(format!("unsupported model kind '{}'", file.kind));
        }
        if file.features != FEATURE_COUNT {
            return Err(format!("expected {FEATURE_COUNT} features, file has {}", file.features));
        }
        if file.seq_len == 0 {
            return Err("seq_len must be > 0".to_string());
        }
        let cols = file.seq_len * FEATURE_COUNT;
        if file.weights.len() != FEATURE_COUNT || file.weights.iter().any(|r| r.len() != cols) {
            return Err(format!("weights must be {FEATURE_COUNT} rows of {cols} values"));
        }
        if file.bias.len() != FEATURE_COUNT {
            return Err(format!("bias must have {FEATURE_COUNT} values"));
        }
        let all_finite = file
            .weights
            .iter()
            .flatten()
            .chain(file.bias.iter())
            .all(|v| v.is_finite());
        if !all_finite || !(file.learning_rate.is_finite() && file.learning_rate > 0.0) {
            return Err("model file contains non-finite parameters".to_string());
        }

        Ok(Self {
            seq_len: file.seq_len,
            learning_rate: file.learning_rate,
            weights: DMatrix::from_fn(FEATURE_COUNT, cols, |r, c| file.weights[r][c]),
            bias: DVector::from_vec(file.bias),
        })
    }
}
