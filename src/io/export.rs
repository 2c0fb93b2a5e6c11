//! CSV exports: per-epoch training history and observation files.
//!
//! Both are meant to be easy to consume in spreadsheets or downstream scripts.

use std::io::Write;
use std::path::Path;

use crate::domain::{EpochMetrics, Observation};
use crate::error::{ForecastError, Result};

/// Timestamp layout for exported observations; the fraction is omitted for whole seconds.
pub const EXPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Write training history to a CSV file.
pub fn write_history_csv(path: &Path, history: &[EpochMetrics]) -> Result<()> {
    let file = std::fs::File::create(path)
        .map_err(|e| ForecastError::Input(format!("Failed to create history CSV '{}': {e}", path.display())))?;
    write_history(file, history)
}

/// Write training history as CSV to any writer.
pub fn write_history<W: Write>(out: W, history: &[EpochMetrics]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["epoch", "train_loss", "val_loss", "val_mae"])?;
    for m in history {
        wtr.write_record([
            m.epoch.to_string(),
            format!("{:.8}", m.train_loss),
            format!("{:.8}", m.val_loss),
            format!("{:.8}", m.val_mae),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write observations in the same layout `load_observations` reads.
pub fn write_observations_csv(path: &Path, observations: &[Observation]) -> Result<()> {
    let file = std::fs::File::create(path)
        .map_err(|e| ForecastError::Input(format!("Failed to create observation CSV '{}': {e}", path.display())))?;
    write_observations(file, observations)
}

/// Write observations as CSV to any writer.
pub fn write_observations<W: Write>(out: W, observations: &[Observation]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["timestamp", "temperature", "humidity", "pressure", "wind_speed", "rainfall"])?;
    for o in observations {
        wtr.write_record([
            o.timestamp.format(EXPORT_TIMESTAMP_FORMAT).to_string(),
            o.temperature.to_string(),
            o.humidity.to_string(),
            o.pressure.to_string(),
            o.wind_speed.to_string(),
            o.rainfall.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate_observations;
    use crate::io::load_observations;

    #[test]
    fn history_csv_has_header_and_one_row_per_epoch() {
        let history = vec![
            EpochMetrics {
                epoch: 1,
                train_loss: 0.5,
                val_loss: 0.25,
                val_mae: 0.4,
            },
            EpochMetrics {
                epoch: 2,
                train_loss: 0.125,
                val_loss: 0.0625,
                val_mae: 0.2,
            },
        ];
        let mut buf = Vec::new();
        write_history(&mut buf, &history).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "epoch,train_loss,val_loss,val_mae");
        assert_eq!(lines[1], "1,0.50000000,0.25000000,0.40000000");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn observation_csv_reads_back() {
        let start = chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let observations = generate_observations(48, 3, start).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("obs.csv");

        write_observations_csv(&path, &observations).unwrap();
        let back = load_observations(&path).unwrap();
        assert!(back.row_errors.is_empty());
        assert_eq!(back.observations, observations);
    }

    #[test]
    fn sub_second_timestamps_survive_export() {
        let base = chrono::NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_milli_opt(12, 0, 0, 250)
            .unwrap();
        let observations = vec![
            Observation::new(base, [21.5, 60.0, 1012.0, 3.0, 0.0]),
            Observation::new(base + chrono::Duration::seconds(1), [21.6, 60.5, 1012.1, 3.1, 0.2]),
        ];

        let mut buf = Vec::new();
        write_observations(&mut buf, &observations).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("2025-03-09 12:00:00.250"), "{text}");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("obs.csv");
        write_observations_csv(&path, &observations).unwrap();
        let back = load_observations(&path).unwrap();
        assert!(back.row_errors.is_empty());
        assert_eq!(back.observations, observations);
    }
}
