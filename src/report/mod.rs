//! Reporting utilities: training summaries and formatted terminal output.

use crate::domain::{TrainingReport, TrainingStatus};

pub mod format;

pub use format::*;

/// Headline numbers of a finished training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSummary {
    pub status: TrainingStatus,
    pub epochs_run: usize,
    pub final_train_loss: f64,
    pub final_val_loss: f64,
    pub final_val_mae: f64,
    pub best_epoch: usize,
    pub best_val_loss: f64,
}

impl TrainingSummary {
    /// `None` when the report has no epochs.
    pub fn from_report(report: &TrainingReport) -> Option<Self> {
        let last = report.final_metrics()?;
        Some(Self {
            status: report.status,
            epochs_run: report.epochs_run,
            final_train_loss: last.train_loss,
            final_val_loss: last.val_loss,
            final_val_mae: last.val_mae,
            best_epoch: report.best_epoch,
            best_val_loss: report.best_val_loss,
        })
    }
}
