//! Epoch loop with checkpointing and early stopping.
//!
//! Each epoch:
//! 1) one ordered pass over the training windows in `batch_size` chunks
//! 2) evaluation on the validation split (MSE drives every decision, MAE is
//!    recorded for reporting)
//! 3) checkpoint on strict improvement, optionally persisted to disk
//! 4) stop once `patience` epochs pass without improvement
//!
//! Whichever way the loop ends, the best checkpoint's parameters are restored
//! before returning.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::data::{Dataset, build_dataset};
use crate::domain::{EpochMetrics, Observation, TrainingConfig, TrainingReport, TrainingStatus};
use crate::error::{ForecastError, Result};
use crate::fit::callbacks::{CheckpointTracker, EarlyStopping};
use crate::io::{ArtifactPaths, save_artifact};
use crate::math::MinMaxScaler;
use crate::models::SequenceModel;

/// A model restored to its best epoch, with the scaler it was trained against.
#[derive(Debug, Clone)]
pub struct TrainedModel<M> {
    pub model: M,
    pub scaler: MinMaxScaler,
    pub report: TrainingReport,
}

/// Build the dataset from raw observations and train `model` on it.
pub fn train<M>(mut model: M, observations: &[Observation], config: &TrainingConfig) -> Result<TrainedModel<M>>
where
    M: SequenceModel + Serialize,
{
    config.validate()?;
    if model.seq_len() != config.seq_len {
        return Err(ForecastError::InvalidParameter(format!(
            "model window length {} does not match configured seq_len {}",
            model.seq_len(),
            config.seq_len
        )));
    }

    let dataset = build_dataset(observations, config.seq_len, None)?;
    let report = fit_dataset(&mut model, &dataset, config)?;

    Ok(TrainedModel {
        model,
        scaler: dataset.scaler,
        report,
    })
}

/// Run the epoch loop on a prepared dataset.
pub fn fit_dataset<M>(model: &mut M, dataset: &Dataset, config: &TrainingConfig) -> Result<TrainingReport>
where
    M: SequenceModel + Serialize,
{
    config.validate()?;
    if dataset.train.is_empty() {
        return Err(ForecastError::EmptyTrainingSplit {
            windows: dataset.window_count(),
        });
    }

    let train = &dataset.train;
    let val = &dataset.validation;
    let checkpoint_dir = config.checkpoint_path.as_deref();

    info!(
        train_windows = train.len(),
        val_windows = val.len(),
        epochs = config.epochs,
        batch_size = config.batch_size,
        patience = config.patience,
        "starting training"
    );

    let mut tracker = CheckpointTracker::new();
    let mut stopper = EarlyStopping::new(config.patience);
    let mut history = Vec::with_capacity(config.epochs);
    let mut status = TrainingStatus::Completed;

    for epoch in 1..=config.epochs {
        let train_loss = model.train_epoch(&train.inputs, &train.targets, config.batch_size)?;
        let val_loss = model.evaluate(&val.inputs, &val.targets)?;

        history.push(EpochMetrics {
            epoch,
            train_loss,
            val_loss: val_loss.mse,
            val_mae: val_loss.mae,
        });

        let improved = tracker.observe(epoch, val_loss.mse, || model.params());
        debug!(
            epoch,
            train_loss,
            val_loss = val_loss.mse,
            val_mae = val_loss.mae,
            improved,
            "epoch finished"
        );

        if improved {
            if let Some(dir) = checkpoint_dir {
                write_checkpoint(dir, model, &dataset.scaler)?;
            }
        }

        if stopper.update(improved) && epoch < config.epochs {
            warn!(
                epoch,
                patience = config.patience,
                best_epoch = ?tracker.best_epoch(),
                "validation loss stopped improving, stopping early"
            );
            status = TrainingStatus::StoppedEarly;
            break;
        }
    }

    let best_val_loss = tracker.best_loss();
    let (best_epoch, params) = tracker.into_best().ok_or_else(|| {
        ForecastError::Numerical("validation loss was never finite; no checkpoint to restore".to_string())
    })?;
    model.set_params(params);
    info!(best_epoch, best_val_loss, "restored best checkpoint");

    Ok(TrainingReport {
        status,
        epochs_run: history.len(),
        best_epoch,
        best_val_loss,
        train_windows: train.len(),
        val_windows: val.len(),
        history,
    })
}

fn write_checkpoint<M: Serialize>(dir: &Path, model: &M, scaler: &MinMaxScaler) -> Result<()> {
    let paths = ArtifactPaths::from_dir(dir);
    save_artifact(&paths, model, scaler)?;
    debug!(dir = %dir.display(), "checkpoint written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeatureRow;
    use crate::math::Loss;
    use crate::models::LinearSequenceModel;
    use chrono::{Duration, NaiveDate};

    /// Returns preset validation losses; its only "parameter" is the epoch count.
    #[derive(Debug, Serialize)]
    struct ScriptedModel {
        seq_len: usize,
        val_losses: Vec<f64>,
        epochs_seen: usize,
    }

    impl ScriptedModel {
        fn new(seq_len: usize, val_losses: &[f64]) -> Self {
            Self {
                seq_len,
                val_losses: val_losses.to_vec(),
                epochs_seen: 0,
            }
        }
    }

    impl SequenceModel for ScriptedModel {
        type Params = usize;

        fn kind(&self) -> &'static str {
            "scripted"
        }

        fn seq_len(&self) -> usize {
            self.seq_len
        }

        fn train_batch(&mut self, _inputs: &[Vec<FeatureRow>], _targets: &[FeatureRow]) -> Result<f64> {
            Ok(1.0)
        }

        fn train_epoch(&mut self, _inputs: &[Vec<FeatureRow>], _targets: &[FeatureRow], _batch: usize) -> Result<f64> {
            self.epochs_seen += 1;
            Ok(1.0)
        }

        fn predict(&self, _input: &[FeatureRow]) -> Result<FeatureRow> {
            Ok([0.0; 5])
        }

        fn params(&self) -> usize {
            self.epochs_seen
        }

        fn set_params(&mut self, params: usize) {
            self.epochs_seen = params;
        }

        fn evaluate(&self, _inputs: &[Vec<FeatureRow>], _targets: &[FeatureRow]) -> Result<Loss> {
            let idx = (self.epochs_seen - 1).min(self.val_losses.len() - 1);
            let mse = self.val_losses[idx];
            Ok(Loss { mse, mae: mse.sqrt() })
        }
    }

    fn trend(n: usize) -> Vec<Observation> {
        let start = NaiveDate::from_ymd_opt(2025, 5, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        (0..n)
            .map(|i| {
                let t = i as f64;
                Observation::new(
                    start + Duration::hours(i as i64),
                    [20.0 + 0.5 * t, 70.0 + (t * 0.7).sin(), 1010.0 - 0.1 * t, 5.0, 0.0],
                )
            })
            .collect()
    }

    fn config(seq_len: usize, epochs: usize, patience: usize) -> TrainingConfig {
        TrainingConfig {
            seq_len,
            epochs,
            batch_size: 8,
            patience,
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn early_stop_restores_best_epoch() {
        let model = ScriptedModel::new(4, &[1.0, 0.5, 0.4, 0.45, 0.41, 0.4, 0.6, 0.7]);
        let out = train(model, &trend(40), &config(4, 50, 3)).unwrap();

        assert_eq!(out.report.status, TrainingStatus::StoppedEarly);
        assert_eq!(out.report.epochs_run, 6);
        assert_eq!(out.report.best_epoch, 3);
        assert_eq!(out.report.best_val_loss, 0.4);
        // Parameters are the checkpoint's, not the last epoch's.
        assert_eq!(out.model.params(), 3);
    }

    #[test]
    fn improving_run_completes_all_epochs() {
        let losses: Vec<f64> = (0..10).map(|i| 1.0 / (i as f64 + 1.0)).collect();
        let model = ScriptedModel::new(4, &losses);
        let out = train(model, &trend(40), &config(4, 10, 3)).unwrap();

        assert_eq!(out.report.status, TrainingStatus::Completed);
        assert_eq!(out.report.epochs_run, 10);
        assert_eq!(out.report.best_epoch, 10);
        assert_eq!(out.report.history.len(), 10);
        assert_eq!(out.report.history[0].epoch, 1);
    }

    #[test]
    fn plateau_on_last_epoch_still_counts_as_completed() {
        let model = ScriptedModel::new(4, &[0.5, 0.6, 0.6]);
        let out = train(model, &trend(40), &config(4, 3, 2)).unwrap();
        assert_eq!(out.report.status, TrainingStatus::Completed);
        assert_eq!(out.model.params(), 1);
    }

    #[test]
    fn single_window_dataset_rejected_before_training() {
        let model = ScriptedModel::new(24, &[1.0]);
        let err = train(model, &trend(25), &config(24, 5, 2)).unwrap_err();
        assert!(matches!(err, ForecastError::EmptyTrainingSplit { windows: 1 }));
    }

    #[test]
    fn too_few_observations_reported() {
        let model = ScriptedModel::new(24, &[1.0]);
        let err = train(model, &trend(10), &config(24, 5, 2)).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientData { required: 25, actual: 10 }
        ));
    }

    #[test]
    fn mismatched_window_length_rejected() {
        let model = ScriptedModel::new(12, &[1.0]);
        assert!(matches!(
            train(model, &trend(40), &config(24, 5, 2)),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn linear_model_beats_persistence_and_checkpoints_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(6, 40, 10);
        cfg.checkpoint_path = Some(dir.path().to_path_buf());

        let model = LinearSequenceModel::new(6, cfg.learning_rate).unwrap();
        let out = train(model, &trend(80), &cfg).unwrap();

        let first = out.report.history[0].val_loss;
        assert!(out.report.best_val_loss <= first);
        assert!(out.report.best_val_loss.is_finite());

        let paths = ArtifactPaths::from_dir(dir.path());
        assert!(paths.model.exists());
        assert!(paths.scaler.exists());
    }
}
