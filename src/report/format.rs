//! Formatted terminal output.
//!
//! Formatting lives in one place so the training and inference code stays free
//! of presentation details.

use std::path::Path;

use crate::domain::{EpochMetrics, ServiceStatus, TrainingConfig, TrainingReport, TrainingStatus};
use crate::report::TrainingSummary;

/// Epoch rows shown at each end of the history table before eliding.
const HISTORY_EDGE_ROWS: usize = 5;

/// Inputs to the training summary that do not live in the report itself.
#[derive(Debug, Clone, Copy)]
pub struct RunContext<'a> {
    pub data_path: &'a Path,
    pub rows_used: usize,
    pub rows_skipped: usize,
    pub model_dir: &'a Path,
}

/// Format the full training summary (data, config, history, outcome).
pub fn format_training_summary(report: &TrainingReport, config: &TrainingConfig, ctx: &RunContext<'_>) -> String {
    let mut out = String::new();

    out.push_str("=== wx - sequence model training ===\n");
    out.push_str(&format!(
        "Data: {} | rows={} (skipped {})\n",
        ctx.data_path.display(),
        ctx.rows_used,
        ctx.rows_skipped
    ));
    out.push_str(&format!(
        "Windows: train={} val={} | seq_len={}\n",
        report.train_windows, report.val_windows, config.seq_len
    ));
    out.push_str(&format!(
        "Config: epochs={} batch={} patience={} lr={}\n",
        config.epochs, config.batch_size, config.patience, config.learning_rate
    ));

    out.push_str("\nHistory:\n");
    out.push_str(&format_history_table(&report.history, report.best_epoch));

    out.push_str("\nOutcome:\n");
    let status = match report.status {
        TrainingStatus::Completed => "completed",
        TrainingStatus::StoppedEarly => "stopped early",
    };
    out.push_str(&format!("- {status} after {} epoch(s)\n", report.epochs_run));
    if let Some(s) = TrainingSummary::from_report(report) {
        out.push_str(&format!("- final train loss: {:.6}\n", s.final_train_loss));
        out.push_str(&format!("- final val loss  : {:.6} (mae {:.6})\n", s.final_val_loss, s.final_val_mae));
        out.push_str(&format!("- best val loss   : {:.6} (epoch {})\n", s.best_val_loss, s.best_epoch));
    }
    out.push_str(&format!("- artifacts       : {}\n", ctx.model_dir.display()));

    out
}

/// Per-epoch table; long histories keep the first and last rows.
pub fn format_history_table(history: &[EpochMetrics], best_epoch: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "  {:>5} {:>12} {:>12} {:>12}\n",
        "epoch", "train_loss", "val_loss", "val_mae"
    ));

    let elide = history.len() > HISTORY_EDGE_ROWS * 2;
    for (i, m) in history.iter().enumerate() {
        if elide && i == HISTORY_EDGE_ROWS {
            out.push_str(&format!("  {:>5}\n", "..."));
        }
        if elide && i >= HISTORY_EDGE_ROWS && i < history.len() - HISTORY_EDGE_ROWS && m.epoch != best_epoch {
            continue;
        }
        let marker = if m.epoch == best_epoch { "*" } else { " " };
        out.push_str(&format!(
            "{marker} {:>5} {:>12.6} {:>12.6} {:>12.6}\n",
            m.epoch, m.train_loss, m.val_loss, m.val_mae
        ));
    }

    out
}

/// Human-readable service status.
pub fn format_status(status: &ServiceStatus) -> String {
    let mut out = String::new();
    out.push_str(&format!("mode: {}\n", status.model_status.as_str()));
    out.push_str(&format!("seq_len: {}\n", status.seq_len));
    if let Some(model) = &status.model {
        out.push_str(&format!(
            "model: {} (seq_len={}, features={})\n",
            model.kind, model.seq_len, model.features
        ));
    }
    if let Some(reason) = &status.fallback_reason {
        out.push_str(&format!("fallback: {reason}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ModelInfo, ServiceMode};

    fn history(n: usize) -> Vec<EpochMetrics> {
        (1..=n)
            .map(|epoch| EpochMetrics {
                epoch,
                train_loss: 1.0 / epoch as f64,
                val_loss: 2.0 / epoch as f64,
                val_mae: 0.5,
            })
            .collect()
    }

    #[test]
    fn short_history_lists_every_epoch_and_marks_best() {
        let table = format_history_table(&history(3), 2);
        assert_eq!(table.lines().count(), 4);
        assert!(table.lines().nth(2).unwrap().starts_with('*'));
        assert!(!table.contains("..."));
    }

    #[test]
    fn long_history_is_elided_but_keeps_best() {
        let table = format_history_table(&history(30), 17);
        assert!(table.contains("..."));
        assert!(table.lines().any(|l| l.starts_with('*') && l.contains(" 17 ")));
        // header + 5 head + ellipsis + best + 5 tail
        assert_eq!(table.lines().count(), 13);
    }

    #[test]
    fn summary_reports_outcome_and_losses() {
        let report = TrainingReport {
            status: TrainingStatus::StoppedEarly,
            epochs_run: 3,
            best_epoch: 2,
            best_val_loss: 1.0,
            train_windows: 4,
            val_windows: 2,
            history: history(3),
        };
        let ctx = RunContext {
            data_path: Path::new("weather.csv"),
            rows_used: 30,
            rows_skipped: 0,
            model_dir: Path::new("model"),
        };
        let text = format_training_summary(&report, &TrainingConfig::default(), &ctx);
        assert!(text.contains("stopped early after 3 epoch(s)"));
        assert!(text.contains("best val loss   : 1.000000 (epoch 2)"));
        assert!(text.contains("train=4 val=2"));
    }

    #[test]
    fn status_lists_fallback_reason() {
        let status = ServiceStatus {
            model_status: ServiceMode::Mock,
            seq_len: 24,
            model: None,
            fallback_reason: Some("missing".to_string()),
        };
        let text = format_status(&status);
        assert!(text.contains("mode: mock"));
        assert!(text.contains("fallback: missing"));

        let loaded = ServiceStatus {
            model_status: ServiceMode::Loaded,
            seq_len: 24,
            model: Some(ModelInfo {
                kind: "residual-linear".to_string(),
                seq_len: 24,
                features: 5,
            }),
            fallback_reason: None,
        };
        assert!(format_status(&loaded).contains("model: residual-linear"));
    }
}
