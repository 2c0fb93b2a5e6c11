//! Read/write trained artifacts.
//!
//! A model directory holds two JSON files:
//! - `sequence_model.json`: model kind, window length, parameters
//! - `scaler.json`: per-feature min/max the model was trained against
//!
//! They are only meaningful together, so [`save_artifact`] writes both to
//! temporary files first and renames them into place only after both writes
//! succeed. The scaler is renamed first and the model last; if the model
//! rename fails, the previous scaler is put back.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::error::{ForecastError, Result};
use crate::math::MinMaxScaler;

pub const MODEL_FILE: &str = "sequence_model.json";
pub const SCALER_FILE: &str = "scaler.json";

/// Environment variable naming the model directory.
pub const MODEL_DIR_ENV: &str = "WEATHER_MODEL_DIR";
pub const DEFAULT_MODEL_DIR: &str = "model";

const TMP_SUFFIX: &str = ".tmp";
const BACKUP_SUFFIX: &str = ".bak";

/// Locations of the two artifact files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    pub model: PathBuf,
    pub scaler: PathBuf,
}

impl ArtifactPaths {
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            model: dir.join(MODEL_FILE),
            scaler: dir.join(SCALER_FILE),
            dir,
        }
    }

    /// `WEATHER_MODEL_DIR`, falling back to `./model`.
    pub fn from_env() -> Self {
        let dir = std::env::var(MODEL_DIR_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL_DIR.to_string());
        Self::from_dir(dir)
    }

    /// Explicit directory wins over the environment.
    pub fn resolve(dir: Option<&Path>) -> Self {
        match dir {
            Some(d) => Self::from_dir(d),
            None => Self::from_env(),
        }
    }
}

/// A trained model together with the scaler it was trained against.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedArtifact<M> {
    pub model: M,
    pub scaler: MinMaxScaler,
}

/// Write model + scaler as one unit.
pub fn save_artifact<M: Serialize>(paths: &ArtifactPaths, model: &M, scaler: &MinMaxScaler) -> Result<()> {
    fs::create_dir_all(&paths.dir).map_err(|e| {
        ForecastError::Input(format!(
            "Failed to create model directory '{}': {e}",
            paths.dir.display()
        ))
    })?;

    let model_tmp = tmp_path(&paths.model);
    let scaler_tmp = tmp_path(&paths.scaler);

    let written = write_json(&model_tmp, model)
        .and_then(|()| write_json(&scaler_tmp, scaler))
        .and_then(|()| commit_pair(paths, &model_tmp, &scaler_tmp));

    if let Err(e) = written {
        let _ = fs::remove_file(&model_tmp);
        let _ = fs::remove_file(&scaler_tmp);
        return Err(e);
    }

    info!(dir = %paths.dir.display(), "saved model artifacts");
    Ok(())
}

/// Read model + scaler. Any failure is reported as [`ForecastError::ArtifactLoad`].
pub fn load_artifact<M: DeserializeOwned>(paths: &ArtifactPaths) -> Result<TrainedArtifact<M>> {
    let model = read_json(&paths.model)?;
    let scaler = read_json(&paths.scaler)?;
    Ok(TrainedArtifact { model, scaler })
}

/// Move both temp files into place, scaler first. The model file only
/// changes once its scaler is in place.
fn commit_pair(paths: &ArtifactPaths, model_tmp: &Path, scaler_tmp: &Path) -> Result<()> {
    let backup = with_suffix(&paths.scaler, BACKUP_SUFFIX);
    let previous = if paths.scaler.is_file() {
        fs::copy(&paths.scaler, &backup)?;
        Some(backup)
    } else {
        None
    };

    let committed = fs::rename(scaler_tmp, &paths.scaler).and_then(|()| {
        fs::rename(model_tmp, &paths.model).inspect_err(|e| {
            warn!(error = %e, dir = %paths.dir.display(), "model rename failed, restoring previous scaler");
            let _ = match &previous {
                Some(saved) => fs::rename(saved, &paths.scaler),
                None => fs::remove_file(&paths.scaler),
            };
        })
    });

    if let Some(saved) = &previous {
        let _ = fs::remove_file(saved);
    }
    Ok(committed?)
}

fn tmp_path(path: &Path) -> PathBuf {
    with_suffix(path, TMP_SUFFIX)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let load_err = |reason: String| ForecastError::ArtifactLoad {
        path: path.to_path_buf(),
        reason,
    };
    let file = File::open(path).map_err(|e| load_err(e.to_string()))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| load_err(e.to_string()))
}
