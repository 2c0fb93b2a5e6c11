//! Single-sequence inference.
//!
//! An [`InferenceService`] decides its mode once, at construction:
//!
//! - **loaded**: model + scaler artifacts parsed and match the configured
//!   window length. Requests are validated, scaled, predicted and inverse-scaled.
//! - **mock**: artifacts missing or unusable. Every request gets the same
//!   placeholder prediction, without validation. The reason is logged once and
//!   reported by [`InferenceService::status`].
//!
//! Prediction is `&self` over immutable state, so one service can be shared
//! across threads.

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::domain::{
    FEATURE_COUNT, FeatureRow, ModelInfo, PREDICTION_DECIMALS, PredictionResponse, SequenceRequest, ServiceMode,
    ServiceStatus, WeatherPrediction,
};
use crate::error::{ForecastError, Result};
use crate::io::{ArtifactPaths, TrainedArtifact, load_artifact};
use crate::models::{LinearSequenceModel, SequenceModel};

pub mod mock;

pub use mock::*;

/// Placeholder answer served in mock mode.
pub const MOCK_PREDICTION: WeatherPrediction = WeatherPrediction {
    temperature: 28.5,
    humidity: 75.2,
    pressure: 1013.2,
    wind_speed: 3.2,
    rainfall: 2.1,
};

#[derive(Debug)]
enum Backend<M> {
    Loaded(TrainedArtifact<M>),
    Mock { reason: String },
}

#[derive(Debug)]
pub struct InferenceService<M = LinearSequenceModel> {
    seq_len: usize,
    backend: Backend<M>,
}

impl<M> InferenceService<M>
where
    M: SequenceModel + DeserializeOwned,
{
    /// Load artifacts from `paths`. Never fails: any problem selects mock mode.
    pub fn load(paths: &ArtifactPaths, seq_len: usize) -> Self {
        let loaded = load_artifact::<M>(paths).and_then(|artifact| {
            if artifact.model.seq_len() == seq_len {
                Ok(artifact)
            } else {
                Err(ForecastError::ArtifactLoad {
                    path: paths.model.clone(),
                    reason: format!(
                        "model window length {} does not match configured {seq_len}",
                        artifact.model.seq_len()
                    ),
                })
            }
        });

        match loaded {
            Ok(artifact) => {
                info!(dir = %paths.dir.display(), kind = artifact.model.kind(), seq_len, "model loaded");
                Self {
                    seq_len,
                    backend: Backend::Loaded(artifact),
                }
            }
            Err(e) => {
                warn!(error = %e, "model unavailable, serving mock predictions");
                Self::mock(seq_len, e.to_string())
            }
        }
    }
}

impl<M: SequenceModel> InferenceService<M> {
    /// Serve an in-memory artifact; the window length comes from the model.
    pub fn from_artifact(artifact: TrainedArtifact<M>) -> Self {
        Self {
            seq_len: artifact.model.seq_len(),
            backend: Backend::Loaded(artifact),
        }
    }

    pub fn mock(seq_len: usize, reason: impl Into<String>) -> Self {
        Self {
            seq_len,
            backend: Backend::Mock { reason: reason.into() },
        }
    }

    pub fn mode(&self) -> ServiceMode {
        match self.backend {
            Backend::Loaded(_) => ServiceMode::Loaded,
            Backend::Mock { .. } => ServiceMode::Mock,
        }
    }

    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    /// Predict the next reading from `request` (oldest value first in each array).
    pub fn predict(&self, request: &SequenceRequest) -> Result<PredictionResponse> {
        let artifact = match &self.backend {
            Backend::Loaded(artifact) => artifact,
            Backend::Mock { .. } => {
                return Ok(PredictionResponse {
                    model_status: ServiceMode::Mock,
                    prediction: MOCK_PREDICTION,
                });
            }
        };

        let rows = request_rows(request, self.seq_len)?;
        let scaled = artifact.scaler.transform(&rows);
        let next = artifact.model.predict(&scaled)?;
        let prediction =
            WeatherPrediction::from_row(artifact.scaler.inverse_transform_row(&next)).rounded(PREDICTION_DECIMALS);

        if !prediction.is_finite() {
            return Err(ForecastError::Numerical(
                "model produced a non-finite prediction".to_string(),
            ));
        }

        Ok(PredictionResponse {
            model_status: ServiceMode::Loaded,
            prediction,
        })
    }

    pub fn status(&self) -> ServiceStatus {
        match &self.backend {
            Backend::Loaded(artifact) => ServiceStatus {
                model_status: ServiceMode::Loaded,
                seq_len: self.seq_len,
                model: Some(ModelInfo {
                    kind: artifact.model.kind().to_string(),
                    seq_len: artifact.model.seq_len(),
                    features: FEATURE_COUNT,
                }),
                fallback_reason: None,
            },
            Backend::Mock { reason } => ServiceStatus {
                model_status: ServiceMode::Mock,
                seq_len: self.seq_len,
                model: None,
                fallback_reason: Some(reason.clone()),
            },
        }
    }
}

/// Check shape and values, then turn the five columns into `seq_len` rows.
fn request_rows(request: &SequenceRequest, seq_len: usize) -> Result<Vec<FeatureRow>> {
    let columns = request.columns();

    if columns.iter().any(|(_, values)| values.len() != seq_len) {
        let lengths = columns
            .iter()
            .map(|(feature, values)| format!("{}={}", feature.name(), values.len()))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(ForecastError::Validation(format!(
            "Each array must have {seq_len} values (got {lengths})"
        )));
    }

    for (feature, values) in &columns {
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::Validation(format!(
                "`{}` has a non-finite value at position {pos}",
                feature.name()
            )));
        }
    }

    Ok((0..seq_len)
        .map(|i| {
            let mut row = [0.0; FEATURE_COUNT];
            for (feature, values) in &columns {
                row[feature.index()] = values[i];
            }
            row
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::save_artifact;
    use crate::math::MinMaxScaler;

    fn scaler() -> MinMaxScaler {
        MinMaxScaler::fit(&[[20.0, 40.0, 1000.0, 0.0, 0.0], [35.0, 95.0, 1020.0, 10.0, 10.0]]).unwrap()
    }

    fn loaded(seq_len: usize) -> InferenceService {
        InferenceService::from_artifact(TrainedArtifact {
            model: LinearSequenceModel::new(seq_len, 0.5).unwrap(),
            scaler: scaler(),
        })
    }

    fn request(len: usize) -> SequenceRequest {
        let rows: Vec<FeatureRow> = (0..len)
            .map(|i| [25.0 + i as f64 * 0.1, 60.0, 1010.0, 3.0, 0.5])
            .collect();
        SequenceRequest::from_rows(&rows)
    }

    #[test]
    fn loaded_prediction_is_rounded_and_finite() {
        let service = loaded(24);
        let out = service.predict(&request(24)).unwrap();
        assert_eq!(out.model_status, ServiceMode::Loaded);
        // Untrained residual model repeats the last row.
        assert_eq!(out.prediction.temperature, 27.3);
        assert_eq!(out.prediction.humidity, 60.0);
        assert_eq!(out.prediction.pressure, 1010.0);
        assert!(out.prediction.is_finite());
        assert_eq!(out.prediction, out.prediction.rounded(2));
    }

    #[test]
    fn huge_finite_input_stays_finite_after_rounding() {
        let service = loaded(24);
        let mut req = request(24);
        req.temperature = vec![1.0e307; 24];
        let out = service.predict(&req).unwrap();
        assert!(out.prediction.is_finite(), "{:?}", out.prediction);
        assert!(out.prediction.temperature > 1.0e306);
        assert_eq!(out.prediction.humidity, 60.0);
    }

    #[test]
    fn short_array_names_expected_length() {
        let service = loaded(24);
        let mut req = request(24);
        req.humidity.pop();
        let err = service.predict(&req).unwrap_err();
        assert!(err.is_client_error());
        let msg = err.to_string();
        assert!(msg.contains("24"), "{msg}");
        assert!(msg.contains("humidity=23"), "{msg}");
    }

    #[test]
    fn non_finite_request_value_rejected() {
        let service = loaded(24);
        let mut req = request(24);
        req.rainfall[5] = f64::NAN;
        let err = service.predict(&req).unwrap_err();
        assert!(matches!(err, ForecastError::Validation(ref m) if m.contains("rainfall")));
    }

    #[test]
    fn mock_mode_skips_validation() {
        let service: InferenceService = InferenceService::mock(24, "no artifacts");
        let out = service.predict(&SequenceRequest::default()).unwrap();
        assert_eq!(out.model_status, ServiceMode::Mock);
        assert_eq!(out.prediction, MOCK_PREDICTION);

        let status = service.status();
        assert_eq!(status.model_status, ServiceMode::Mock);
        assert_eq!(status.fallback_reason.as_deref(), Some("no artifacts"));
        assert!(status.model.is_none());
    }

    #[test]
    fn missing_artifacts_fall_back_to_mock() {
        let dir = tempfile::tempdir().unwrap();
        let service: InferenceService = InferenceService::load(&ArtifactPaths::from_dir(dir.path()), 24);
        assert_eq!(service.mode(), ServiceMode::Mock);
        assert!(service.status().fallback_reason.is_some());
    }

    #[test]
    fn saved_artifacts_load() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::from_dir(dir.path());
        save_artifact(&paths, &LinearSequenceModel::new(24, 0.5).unwrap(), &scaler()).unwrap();

        let service: InferenceService = InferenceService::load(&paths, 24);
        assert_eq!(service.mode(), ServiceMode::Loaded);
        let status = service.status();
        assert_eq!(status.model.map(|m| m.seq_len), Some(24));
    }

    #[test]
    fn window_length_mismatch_selects_mock() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::from_dir(dir.path());
        save_artifact(&paths, &LinearSequenceModel::new(12, 0.5).unwrap(), &scaler()).unwrap();

        let service: InferenceService = InferenceService::load(&paths, 24);
        assert_eq!(service.mode(), ServiceMode::Mock);
        let reason = service.status().fallback_reason.unwrap();
        assert!(reason.contains("12"), "{reason}");
    }

    #[test]
    fn shared_across_threads() {
        let service = loaded(24);
        let req = request(24);
        let expected = service.predict(&req).unwrap();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| assert_eq!(service.predict(&req).unwrap(), expected));
            }
        });
    }

    #[test]
    fn response_json_has_flat_fields() {
        let service: InferenceService = InferenceService::mock(24, "x");
        let json = serde_json::to_value(service.predict(&SequenceRequest::default()).unwrap()).unwrap();
        assert_eq!(json["model_status"], "mock");
        assert_eq!(json["temperature"], 28.5);
        assert_eq!(json["rainfall"], 2.1);
    }
}
