//! Shared training pipeline.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> dataset -> epoch loop -> best checkpoint -> artifacts
//!
//! The CLI then only focuses on presentation.

use std::path::Path;

use tracing::info;

use crate::domain::TrainingConfig;
use crate::error::Result;
use crate::fit::{TrainedModel, train};
use crate::io::{ArtifactPaths, IngestedObservations, load_observations, save_artifact};
use crate::models::LinearSequenceModel;

/// All outputs of a single `wx train` run.
#[derive(Debug, Clone)]
pub struct TrainingRun {
    pub ingest: IngestedObservations,
    pub trained: TrainedModel<LinearSequenceModel>,
    pub paths: ArtifactPaths,
}

/// Ingest `data`, train, and persist model + scaler under `paths`.
pub fn run_training(data: &Path, paths: &ArtifactPaths, config: &TrainingConfig) -> Result<TrainingRun> {
    let ingest = load_observations(data)?;
    info!(
        rows_read = ingest.rows_read,
        rows_used = ingest.rows_used(),
        path = %data.display(),
        "loaded observations"
    );

    let model = LinearSequenceModel::new(config.seq_len, config.learning_rate)?;
    let trained = train(model, &ingest.observations, config)?;
    save_artifact(paths, &trained.model, &trained.scaler)?;

    Ok(TrainingRun {
        ingest,
        trained,
        paths: paths.clone(),
    })
}
