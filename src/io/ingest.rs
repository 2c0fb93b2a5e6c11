//! CSV ingest of hourly weather observations.
//!
//! Expected header (case-insensitive, any order):
//!
//! `timestamp, temperature, humidity, pressure[, wind_speed][, rainfall]`
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Backfill** of optional columns (`wind_speed` → 5.0, `rainfall` → 0.0)
//! - **Time order** guaranteed on output (stable sort by timestamp)

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::warn;

use crate::domain::{DEFAULT_RAINFALL, DEFAULT_WIND_SPEED, Observation};
use crate::error::{ForecastError, Result};

const REQUIRED_COLUMNS: [&str; 4] = ["timestamp", "temperature", "humidity", "pressure"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: ordered observations plus what was skipped.
#[derive(Debug, Clone)]
pub struct IngestedObservations {
    pub observations: Vec<Observation>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl IngestedObservations {
    pub fn rows_used(&self) -> usize {
        self.observations.len()
    }
}

/// Load observations from a CSV file.
pub fn load_observations(path: &Path) -> Result<IngestedObservations> {
    let file = File::open(path)
        .map_err(|e| ForecastError::Input(format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_observations(file)
}

/// Load observations from any CSV reader.
pub fn read_observations<R: std::io::Read>(source: R) -> Result<IngestedObservations> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| ForecastError::Input(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for name in REQUIRED_COLUMNS {
        if !header_map.contains_key(name) {
            return Err(ForecastError::Input(format!("Missing required column: `{name}`")));
        }
    }

    let mut observations = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, &header_map));

        match parsed {
            Ok(obs) => observations.push(obs),
            Err(message) => {
                warn!(line, %message, "skipping CSV row");
                row_errors.push(RowError { line, message });
            }
        }
    }

    if observations.is_empty() {
        return Err(ForecastError::NoData(format!(
            "no valid rows in CSV ({rows_read} read, {} rejected)",
            row_errors.len()
        )));
    }

    // Stable: rows sharing a timestamp keep file order.
    observations.sort_by_key(|o| o.timestamp);

    Ok(IngestedObservations {
        observations,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> std::result::Result<Observation, String> {
    let timestamp = parse_timestamp(get_required(record, header_map, "timestamp")?)?;
    let temperature = parse_required_f64(record, header_map, "temperature")?;
    let humidity = parse_required_f64(record, header_map, "humidity")?;
    let pressure = parse_required_f64(record, header_map, "pressure")?;
    let wind_speed = parse_optional_f64(record, header_map, "wind_speed")?.unwrap_or(DEFAULT_WIND_SPEED);
    let rainfall = parse_optional_f64(record, header_map, "rainfall")?.unwrap_or(DEFAULT_RAINFALL);

    Ok(Observation::new(
        timestamp,
        [temperature, humidity, pressure, wind_speed, rainfall],
    ))
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> std::result::Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_required_f64(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> std::result::Result<f64, String> {
    parse_f64(get_required(record, header_map, name)?, name)
}

/// Absent column or empty cell → `None`; present but malformed → error.
fn parse_optional_f64(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> std::result::Result<Option<f64>, String> {
    get_optional(record, header_map, name)
        .map(|s| parse_f64(s, name))
        .transpose()
}

fn parse_f64(s: &str, name: &str) -> std::result::Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("Invalid `{name}` value '{s}'")),
    }
}

fn parse_timestamp(s: &str) -> std::result::Result<NaiveDateTime, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    const FMTS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    if let Some(dt) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(dt);
    }
    Err(format!(
        "Invalid timestamp '{s}'. Expected RFC 3339, YYYY-MM-DD HH:MM:SS, YYYY-MM-DDTHH:MM:SS or YYYY-MM-DD."
    ))
}
