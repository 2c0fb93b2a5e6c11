//! Loss functions over feature rows.

use crate::domain::{FEATURE_COUNT, FeatureRow};

/// Mean squared and mean absolute error over every element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Loss {
    pub mse: f64,
    pub mae: f64,
}

/// Element-wise MSE / MAE between predictions and targets.
///
/// Returns zeros for empty input. Lengths are assumed equal; extra items in the
/// longer slice are ignored.
pub fn loss(predictions: &[FeatureRow], targets: &[FeatureRow]) -> Loss {
    let n = predictions.len().min(targets.len());
    if n == 0 {
        return Loss { mse: 0.0, mae: 0.0 };
    }

    let mut sq = 0.0;
    let mut abs = 0.0;
    for (p, t) in predictions.iter().zip(targets.iter()) {
        for col in 0..FEATURE_COUNT {
            let e = p[col] - t[col];
            sq += e * e;
            abs += e.abs();
        }
    }

    let count = (n * FEATURE_COUNT) as f64;
    Loss {
        mse: sq / count,
        mae: abs / count,
    }
}
