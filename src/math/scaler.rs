//! Per-feature min/max scaling.
//!
//! `x' = (x - min) / (max - min)` per column, so values inside the fit range land
//! in `[0, 1]` and values outside extrapolate linearly (no clamping).
//!
//! A scaler only exists once fitted: the constructor is [`MinMaxScaler::fit`]
//! (or deserialization of a previously fitted scaler), so "transform before fit"
//! cannot be expressed.
//!
//! Numerical notes:
//! - A constant column (`max - min` below `RANGE_EPS`) transforms to `0.0` and
//!   inverts back to the constant, never NaN/Inf.

use serde::{Deserialize, Serialize};

use crate::domain::{FEATURE_COUNT, FeatureRow};
use crate::error::{ForecastError, Result};

/// Column ranges narrower than this are treated as constant.
const RANGE_EPS: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: FeatureRow,
    max: FeatureRow,
}

impl MinMaxScaler {
    /// Fit per-column min/max jointly over all rows.
    pub fn fit(rows: &[FeatureRow]) -> Result<Self> {
        if rows.is_empty() {
            return Err(ForecastError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }

        let mut min = [f64::INFINITY; FEATURE_COUNT];
        let mut max = [f64::NEG_INFINITY; FEATURE_COUNT];
        for (line, row) in rows.iter().enumerate() {
            for (col, &v) in row.iter().enumerate() {
                if !v.is_finite() {
                    return Err(ForecastError::Numerical(format!(
                        "non-finite value {v} at row {line}, column {col}"
                    )));
                }
                min[col] = min[col].min(v);
                max[col] = max[col].max(v);
            }
        }

        Ok(Self { min, max })
    }

    pub fn min(&self) -> &FeatureRow {
        &self.min
    }

    pub fn max(&self) -> &FeatureRow {
        &self.max
    }

    /// True if column `col` was constant over the fit data.
    pub fn is_degenerate(&self, col: usize) -> bool {
        (self.max[col] - self.min[col]).abs() < RANGE_EPS
    }

    pub fn transform_row(&self, row: &FeatureRow) -> FeatureRow {
        let mut out = [0.0; FEATURE_COUNT];
        for col in 0..FEATURE_COUNT {
            out[col] = if self.is_degenerate(col) {
                0.0
            } else {
                (row[col] - self.min[col]) / (self.max[col] - self.min[col])
            };
        }
        out
    }

    pub fn inverse_transform_row(&self, row: &FeatureRow) -> FeatureRow {
        let mut out = [0.0; FEATURE_COUNT];
        for col in 0..FEATURE_COUNT {
            out[col] = if self.is_degenerate(col) {
                self.min[col]
            } else {
                row[col] * (self.max[col] - self.min[col]) + self.min[col]
            };
        }
        out
    }

    pub fn transform(&self, rows: &[FeatureRow]) -> Vec<FeatureRow> {
        rows.iter().map(|r| self.transform_row(r)).collect()
    }

    pub fn inverse_transform(&self, rows: &[FeatureRow]) -> Vec<FeatureRow> {
        rows.iter().map(|r| self.inverse_transform_row(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rows() -> Vec<FeatureRow> {
        vec![
            [24.0, 60.0, 1005.0, 1.0, 0.0],
            [31.5, 88.0, 1012.5, 7.5, 12.0],
            [28.2, 71.0, 1009.1, 3.3, 2.4],
            [26.9, 95.0, 1001.0, 0.5, 30.0],
        ]
    }

    #[test]
    fn fit_range_maps_to_unit_interval() {
        let rows = sample_rows();
        let scaler = MinMaxScaler::fit(&rows).unwrap();
        for row in scaler.transform(&rows) {
            for v in row {
                assert!((0.0..=1.0).contains(&v), "scaled value out of range: {v}");
            }
        }
        assert_eq!(scaler.min()[0], 24.0);
        assert_eq!(scaler.max()[4], 30.0);
    }

    #[test]
    fn inverse_round_trip_within_tolerance() {
        let rows = sample_rows();
        let scaler = MinMaxScaler::fit(&rows).unwrap();

        // Points inside the fit range, not just the fit rows themselves.
        let extra_rows = [
            [25.0, 61.0, 1003.3, 0.75, 0.1],
            [30.0, 90.0, 1012.0, 6.9, 29.9],
            [27.123456, 77.7, 1008.8, 4.0, 15.0],
        ];
        for row in rows.iter().chain(extra_rows.iter()) {
            let back = scaler.inverse_transform_row(&scaler.transform_row(row));
            for col in 0..FEATURE_COUNT {
                assert!(
                    (back[col] - row[col]).abs() < 1e-6,
                    "col {col}: {} != {}",
                    back[col],
                    row[col]
                );
            }
        }
    }

    #[test]
    fn out_of_range_extrapolates_without_clamping() {
        let scaler = MinMaxScaler::fit(&[[0.0; 5], [10.0; 5]]).unwrap();
        let scaled = scaler.transform_row(&[15.0, -5.0, 10.0, 0.0, 5.0]);
        assert!((scaled[0] - 1.5).abs() < 1e-12);
        assert!((scaled[1] + 0.5).abs() < 1e-12);
        let back = scaler.inverse_transform_row(&scaled);
        assert!((back[0] - 15.0).abs() < 1e-9);
        assert!((back[1] + 5.0).abs() < 1e-9);
    }

    #[test]
    fn constant_column_is_finite() {
        let rows = vec![
            [20.0, 70.0, 1010.0, 5.0, 0.0],
            [21.0, 70.0, 1011.0, 5.0, 0.0],
            [22.0, 70.0, 1012.0, 5.0, 0.0],
        ];
        let scaler = MinMaxScaler::fit(&rows).unwrap();
        assert!(scaler.is_degenerate(1));
        assert!(!scaler.is_degenerate(0));

        for row in scaler.transform(&rows) {
            assert!(row.iter().all(|v| v.is_finite()));
            assert_eq!(row[1], 0.0);
            assert_eq!(row[4], 0.0);
        }
        let back = scaler.inverse_transform_row(&scaler.transform_row(&rows[1]));
        assert_eq!(back[1], 70.0);
        assert_eq!(back[3], 5.0);
    }

    #[test]
    fn fit_rejects_empty_and_non_finite() {
        assert!(matches!(
            MinMaxScaler::fit(&[]),
            Err(ForecastError::InsufficientData { required: 1, actual: 0 })
        ));
        assert!(matches!(
            MinMaxScaler::fit(&[[1.0, f64::NAN, 0.0, 0.0, 0.0]]),
            Err(ForecastError::Numerical(_))
        ));
    }

    #[test]
    fn serde_round_trip_preserves_parameters() {
        let scaler = MinMaxScaler::fit(&sample_rows()).unwrap();
        let json = serde_json::to_string(&scaler).unwrap();
        let back: MinMaxScaler = serde_json::from_str(&json).unwrap();
        assert_eq!(scaler, back);
    }
}
