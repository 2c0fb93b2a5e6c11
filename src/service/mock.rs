//! Synthetic multi-day forecast.
//!
//! Not backed by any model: a sinusoidal temperature pattern around a baseline
//! plus seeded noise. Output only has to look like a forecast, so it is used for
//! demos and for wiring up consumers before a model is trained.

use chrono::{Datelike, Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{DailyForecast, Observation};
use crate::error::{ForecastError, Result};

pub const MAX_FORECAST_DAYS: u32 = 30;
pub const DEFAULT_FORECAST_DAYS: u32 = 7;

/// Levels the synthetic forecast oscillates around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastBaseline {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub rainfall: f64,
}

impl Default for ForecastBaseline {
    fn default() -> Self {
        Self {
            temperature: 28.0,
            humidity: 70.0,
            pressure: 1013.0,
            rainfall: 0.0,
        }
    }
}

impl ForecastBaseline {
    /// Means of the observed history; falls back to the defaults when empty.
    pub fn from_observations(observations: &[Observation]) -> Self {
        if observations.is_empty() {
            return Self::default();
        }
        let n = observations.len() as f64;
        let mean = |f: fn(&Observation) -> f64| observations.iter().map(f).sum::<f64>() / n;
        Self {
            temperature: mean(|o| o.temperature),
            humidity: mean(|o| o.humidity),
            pressure: mean(|o| o.pressure),
            rainfall: mean(|o| o.rainfall),
        }
    }
}

/// `days` synthetic daily records starting the day after `start`.
pub fn mock_daily_forecast(days: u32, city_id: u32, start: NaiveDate) -> Result<Vec<DailyForecast>> {
    mock_daily_forecast_from(&ForecastBaseline::default(), days, city_id, start)
}

/// Like [`mock_daily_forecast`], oscillating around `baseline`.
pub fn mock_daily_forecast_from(
    baseline: &ForecastBaseline,
    days: u32,
    city_id: u32,
    start: NaiveDate,
) -> Result<Vec<DailyForecast>> {
    if !(1..=MAX_FORECAST_DAYS).contains(&days) {
        return Err(ForecastError::Validation(format!(
            "days must be between 1 and {MAX_FORECAST_DAYS}, got {days}"
        )));
    }
    let dates = (1..=days)
        .map(|i| start.checked_add_signed(Duration::days(i64::from(i))))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| {
            ForecastError::Validation(format!("a {days}-day forecast from {start} runs past the last supported date"))
        })?;

    let seed = (u64::from(city_id) << 32) ^ start.num_days_from_ce() as u64;
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::Numerical(format!("noise distribution error: {e}")))?;

    let mut out = Vec::with_capacity(days as usize);
    for (i, date) in (0..days).zip(dates) {
        let x = f64::from(i);
        let temperature = baseline.temperature + 3.0 * (x * 0.5).sin() + noise.sample(&mut rng);
        let humidity =
            (baseline.humidity + 10.0 * (x * 0.3).sin() + 5.0 * noise.sample(&mut rng)).clamp(0.0, 100.0);
        let pressure = baseline.pressure + 5.0 * noise.sample(&mut rng);
        let rainfall = baseline.rainfall + (2.0 * noise.sample(&mut rng)).abs();
        let confidence = rng.gen_range(0.75..=0.95);

        out.push(DailyForecast {
            date,
            predicted_temperature: round_to(temperature, 1),
            predicted_humidity: round_to(humidity, 1),
            predicted_pressure: round_to(pressure, 1),
            predicted_rainfall: round_to(rainfall, 1),
            confidence: round_to(confidence, 2),
            city_id,
        });
    }

    Ok(out)
}

fn round_to(v: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (v * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 7).unwrap()
    }

    #[test]
    fn records_are_ordered_and_in_range() {
        let days = mock_daily_forecast(7, 1, day()).unwrap();
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].date.day(), 8);
        assert!(days.windows(2).all(|w| w[0].date < w[1].date));
        for d in &days {
            assert_eq!(d.city_id, 1);
            assert!((0.75..=0.95).contains(&d.confidence));
            assert!((0.0..=100.0).contains(&d.predicted_humidity));
            assert!(d.predicted_rainfall >= 0.0);
            assert!((15.0..45.0).contains(&d.predicted_temperature));
        }
    }

    #[test]
    fn deterministic_per_city_and_start() {
        let a = mock_daily_forecast(5, 3, day()).unwrap();
        let b = mock_daily_forecast(5, 3, day()).unwrap();
        let c = mock_daily_forecast(5, 4, day()).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn day_count_bounds() {
        assert!(mock_daily_forecast(0, 1, day()).is_err());
        assert!(mock_daily_forecast(31, 1, day()).is_err());
        assert_eq!(mock_daily_forecast(30, 1, day()).unwrap().len(), 30);
    }

    #[test]
    fn forecast_past_last_date_is_rejected() {
        let last = NaiveDate::MAX - Duration::days(3);
        let err = mock_daily_forecast(7, 1, last).unwrap_err();
        assert!(matches!(err, ForecastError::Validation(_)));
        assert_eq!(mock_daily_forecast(3, 1, last).unwrap().last().unwrap().date, NaiveDate::MAX);
    }

    #[test]
    fn baseline_follows_history_means() {
        let ts = day().and_hms_opt(0, 0, 0).unwrap();
        let obs = [
            Observation::new(ts, [10.0, 40.0, 1000.0, 1.0, 2.0]),
            Observation::new(ts, [20.0, 60.0, 1010.0, 3.0, 4.0]),
        ];
        let b = ForecastBaseline::from_observations(&obs);
        assert_eq!(b.temperature, 15.0);
        assert_eq!(b.humidity, 50.0);
        assert_eq!(b.pressure, 1005.0);
        assert_eq!(b.rainfall, 3.0);
        assert_eq!(ForecastBaseline::from_observations(&[]), ForecastBaseline::default());
    }
}
