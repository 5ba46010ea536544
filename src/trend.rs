//! Daily API-usage trend analysis: per-day success and fallback rates, a
//! trailing moving average of call volume, and a least squares forecast.
//!
//! The analyzer trusts the input order as its time axis. Gaps and out of order
//! dates are not corrected; only the forecast calendar dates look at `date`.

use chrono::{DateTime, Days, NaiveDate};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    error::{InsightError, InsightResult},
    numeric::{LinearFit, round_half_up},
};

pub const DEFAULT_MOVING_AVERAGE_WINDOW: i64 = 7;
pub const DEFAULT_FORECAST_HORIZON_DAYS: i64 = 7;
/// Fewer real days than this and no forecast is produced.
pub const MIN_FORECAST_DAYS: usize = 3;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub date: String,
    #[serde(alias = "total_calls")]
    pub total_calls: u64,
    #[serde(default, alias = "success_calls", alias = "successful_calls")]
    pub success_calls: u64,
    #[serde(default, alias = "fallback_calls")]
    pub fallback_calls: u64,
    #[serde(default, alias = "avg_latency_ms")]
    pub avg_latency_ms: f64,
}

impl UsageRecord {
    pub fn new(date: impl Into<String>, total_calls: u64) -> Self {
        Self {
            date: date.into(),
            total_calls,
            success_calls: 0,
            fallback_calls: 0,
            avg_latency_ms: 0.0,
        }
    }

    pub fn with_outcomes(mut self, success_calls: u64, fallback_calls: u64) -> Self {
        self.success_calls = success_calls;
        self.fallback_calls = fallback_calls;
        self
    }

    pub fn with_latency(mut self, avg_latency_ms: f64) -> Self {
        self.avg_latency_ms = avg_latency_ms;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrendOptions {
    pub moving_average_window: i64,
    pub forecast_horizon_days: i64,
    pub include_forecast: bool,
}

impl Default for TrendOptions {
    fn default() -> Self {
        Self {
            moving_average_window: DEFAULT_MOVING_AVERAGE_WINDOW,
            forecast_horizon_days: DEFAULT_FORECAST_HORIZON_DAYS,
            include_forecast: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ValidatedOptions {
    window: usize,
    horizon: usize,
    include_forecast: bool,
}

impl TrendOptions {
    pub fn validate(&self) -> InsightResult<()> {
        self.validated().map(|_| ())
    }

    fn validated(&self) -> InsightResult<ValidatedOptions> {
        if self.moving_average_window < 1 {
            return Err(InsightError::invalid_argument(
                "movingAverageWindow",
                format!("must be at least 1, got {}", self.moving_average_window),
            ));
        }
        if self.forecast_horizon_days < 0 {
            return Err(InsightError::invalid_argument(
                "forecastHorizonDays",
                format!("must not be negative, got {}", self.forecast_horizon_days),
            ));
        }
        let window = usize::try_from(self.moving_average_window)
            .map_err(|e| InsightError::invalid_argument("movingAverageWindow", e.to_string()))?;
        let horizon = usize::try_from(self.forecast_horizon_days)
            .map_err(|e| InsightError::invalid_argument("forecastHorizonDays", e.to_string()))?;
        Ok(ValidatedOptions {
            window,
            horizon,
            include_forecast: self.include_forecast,
        })
    }
}

/// One output day. Real days carry the observed metrics; forecast days carry
/// only `forecastTotalCalls` and have every other metric set to null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: String,
    pub total_calls: Option<u64>,
    pub success_rate: Option<u32>,
    pub fallback_rate: Option<u32>,
    pub moving_average_calls: Option<u64>,
    pub avg_latency_ms: Option<f64>,
    pub forecast_total_calls: Option<u64>,
    pub is_forecast: bool,
}

impl TrendPoint {
    fn observed(record: &UsageRecord, moving_average_calls: u64) -> Self {
        Self {
            date: record.date.clone(),
            total_calls: Some(record.total_calls),
            success_rate: Some(percentage(record.success_calls, record.total_calls)),
            fallback_rate: Some(percentage(record.fallback_calls, record.total_calls)),
            moving_average_calls: Some(moving_average_calls),
            avg_latency_ms: Some(record.avg_latency_ms),
            forecast_total_calls: None,
            is_forecast: false,
        }
    }

    fn forecast(date: String, forecast_total_calls: u64) -> Self {
        Self {
            date,
            total_calls: None,
            success_rate: None,
            fallback_rate: None,
            moving_average_calls: None,
            avg_latency_ms: None,
            forecast_total_calls: Some(forecast_total_calls),
            is_forecast: true,
        }
    }
}

/// Builds the trend series for `records`.
///
/// Fails only when `options` is out of range. Empty input yields an empty
/// series; fewer than [`MIN_FORECAST_DAYS`] days yields no forecast.
pub fn analyze_usage_trend(
    records: &[UsageRecord],
    options: &TrendOptions,
) -> InsightResult<Vec<TrendPoint>> {
    let options = options.validated()?;
    let calls = records.iter().map(|r| r.total_calls).collect::<Vec<_>>();
    let averages = moving_averages(&calls, options.window);

    let mut points = records
        .iter()
        .zip(averages)
        .map(|(record, average)| TrendPoint::observed(record, average))
        .collect::<Vec<_>>();

    if options.include_forecast && records.len() >= MIN_FORECAST_DAYS {
        points.extend(forecast_points(records, options.horizon));
    }
    debug!(
        "Analyzed {} usage day(s) into {} trend point(s)",
        records.len(),
        points.len()
    );
    Ok(points)
}

/// `round(part / total * 100)`, zero when there were no calls.
pub fn percentage(part: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    round_half_up(part as f64 / total as f64 * 100.0) as u32
}

/// Trailing moving average over `[max(0, i - window + 1), i]`, so the first
/// days average over however many days are available.
pub fn moving_averages(values: &[u64], window: usize) -> Vec<u64> {
    let window = window.max(1);
    let prefix = values.iter().fold(vec![0u128], |mut acc, &v| {
        let last = acc[acc.len() - 1];
        acc.push(last + u128::from(v));
        acc
    });
    (0..values.len())
        .map(|idx| {
            let start = (idx + 1).saturating_sub(window);
            let sum = prefix[idx + 1] - prefix[start];
            let len = idx + 1 - start;
            round_half_up(sum as f64 / len as f64) as u64
        })
        .collect()
}

/// Forecast day `k` (1-based) is predicted at `x = n + k`, with the calendar
/// date `k` days after the last real day. Days whose date cannot be placed on
/// the calendar keep their prediction and carry an empty `date`.
fn forecast_points(records: &[UsageRecord], horizon: usize) -> Vec<TrendPoint> {
    if horizon == 0 {
        return Vec::new();
    }
    let ys = records
        .iter()
        .map(|r| r.total_calls as f64)
        .collect::<Vec<_>>();
    let Some(fit) = LinearFit::fit(&ys) else {
        return Vec::new();
    };
    let last_date = last_calendar_date(records);
    if last_date.is_none() {
        warn!("No usage record has an ISO date; forecast days are left undated");
    }
    debug!(
        "Forecast fit over {} day(s): slope={:.4} intercept={:.4}",
        ys.len(),
        fit.slope,
        fit.intercept
    );

    let n = records.len();
    (1..=horizon)
        .map(|k| {
            let date = last_date
                .and_then(|d| d.checked_add_days(Days::new(k as u64)))
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default();
            let predicted = round_half_up(fit.predict((n + k) as f64)).max(0.0);
            TrendPoint::forecast(date, predicted as u64)
        })
        .collect()
}

/// Date of the last real day. Unparsable dates are taken to be one day after
/// the closest earlier parsable date.
fn last_calendar_date(records: &[UsageRecord]) -> Option<NaiveDate> {
    let (offset, anchor) = records
        .iter()
        .rev()
        .enumerate()
        .find_map(|(offset, record)| parse_record_date(&record.date).map(|d| (offset, d)))?;
    anchor.checked_add_days(Days::new(offset as u64))
}

pub fn parse_record_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(calls: &[u64]) -> Vec<UsageRecord> {
        calls
            .iter()
            .enumerate()
            .map(|(idx, &c)| UsageRecord::new(format!("2024-03-{:02}", idx + 1), c))
            .collect()
    }

    #[test]
    fn moving_average_grows_then_slides() {
        assert_eq!(moving_averages(&[10, 20, 30], 7), vec![10, 15, 20]);
        assert_eq!(moving_averages(&[1, 2, 3, 4], 2), vec![1, 2, 3, 4]);
        assert_eq!(moving_averages(&[1, 2, 4, 8], 2), vec![1, 2, 3, 6]);
        assert!(moving_averages(&[], 7).is_empty());
    }

    #[test]
    fn percentage_rounds_and_handles_zero_totals() {
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(5, 0), 0);
    }

    #[test]
    fn forecast_extends_the_regression_line() {
        let points =
            analyze_usage_trend(&series(&[10, 20, 30]), &TrendOptions {
                forecast_horizon_days: 2,
                ..TrendOptions::default()
            })
            .expect("trend");
        assert_eq!(points.len(), 5);
        assert_eq!(points[3].date, "2024-03-04");
        assert_eq!(points[3].forecast_total_calls, Some(50));
        assert_eq!(points[4].date, "2024-03-05");
        assert_eq!(points[4].forecast_total_calls, Some(60));
        assert!(points[3].is_forecast);
        assert_eq!(points[3].total_calls, None);
        assert_eq!(points[3].moving_average_calls, None);
    }

    #[test]
    fn forecast_is_clamped_at_zero() {
        let points = analyze_usage_trend(&series(&[300, 200, 100]), &TrendOptions::default())
            .expect("trend");
        let forecasts = points
            .iter()
            .filter_map(|p| p.forecast_total_calls)
            .collect::<Vec<_>>();
        assert_eq!(forecasts.len(), 7);
        assert!(forecasts.iter().all(|&v| v == 0));
    }

    #[test]
    fn short_series_has_no_forecast() {
        let points =
            analyze_usage_trend(&series(&[5, 6]), &TrendOptions::default()).expect("trend");
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| !p.is_forecast));
    }

    #[test]
    fn invalid_options_are_rejected() {
        let window = TrendOptions {
            moving_average_window: 0,
            ..TrendOptions::default()
        };
        assert!(matches!(
            analyze_usage_trend(&[], &window),
            Err(InsightError::InvalidArgument {
                name: "movingAverageWindow",
                ..
            })
        ));
        let horizon = TrendOptions {
            forecast_horizon_days: -1,
            ..TrendOptions::default()
        };
        assert!(matches!(
            horizon.validate(),
            Err(InsightError::InvalidArgument {
                name: "forecastHorizonDays",
                ..
            })
        ));
    }

    #[test]
    fn unparsable_trailing_dates_advance_the_calendar() {
        let mut records = series(&[1, 2, 3]);
        records[2].date = "not a date".to_string();
        let points = analyze_usage_trend(&records, &TrendOptions {
            forecast_horizon_days: 1,
            ..TrendOptions::default()
        })
        .expect("trend");
        assert_eq!(points[3].date, "2024-03-04");
    }

    #[test]
    fn undated_series_still_forecasts_every_day() {
        let records = ["d1", "d2", "d3"]
            .iter()
            .zip([10, 20, 30])
            .map(|(d, c)| UsageRecord::new(*d, c))
            .collect::<Vec<_>>();
        let points = analyze_usage_trend(&records, &TrendOptions {
            forecast_horizon_days: 2,
            ..TrendOptions::default()
        })
        .expect("trend");
        assert_eq!(points.len(), 5);
        assert_eq!(points[3].date, "");
        assert_eq!(points[3].forecast_total_calls, Some(50));
        assert_eq!(points[4].forecast_total_calls, Some(60));
        assert!(points[3..].iter().all(|p| p.is_forecast));
    }

    #[test]
    fn forecast_past_the_last_representable_date_keeps_its_length() {
        let last = NaiveDate::MAX.format(DATE_FORMAT).to_string();
        let mut records = series(&[1, 2, 3]);
        records[2].date = last.clone();
        let points = analyze_usage_trend(&records, &TrendOptions {
            forecast_horizon_days: 2,
            ..TrendOptions::default()
        })
        .expect("trend");
        assert_eq!(points.len(), 5);
        assert_eq!(points[3].date, "");
        assert_eq!(points[4].forecast_total_calls, Some(6));
    }

    #[test]
    fn moving_average_survives_counter_extremes() {
        assert_eq!(
            moving_averages(&[u64::MAX, u64::MAX], 2),
            vec![u64::MAX, u64::MAX]
        );
        let averages = moving_averages(&[u64::MAX, 1], 2);
        assert_eq!(averages[0], u64::MAX);
        assert!(averages[1] > 0);
    }

    #[test]
    fn parse_record_date_accepts_iso_day_and_rfc3339() {
        let expected = NaiveDate::from_ymd_opt(2024, 2, 29);
        assert_eq!(parse_record_date("2024-02-29"), expected);
        assert_eq!(parse_record_date("2024-02-29T23:00:00Z"), expected);
        assert_eq!(parse_record_date("29/02/2024"), None);
    }

    #[test]
    fn usage_record_accepts_snake_case_fields() {
        let record: UsageRecord = serde_json::from_str(
            r#"{"date":"2024-01-01","total_calls":4,"success_calls":3,"fallback_calls":1,"avg_latency_ms":120.5}"#,
        )
        .expect("record json");
        assert_eq!(record.total_calls, 4);
        assert_eq!(record.success_calls, 3);
        assert_eq!(record.fallback_calls, 1);
        assert_eq!(record.avg_latency_ms, 120.5);
    }

    #[test]
    fn options_default_missing_fields() {
        let options: TrendOptions =
            serde_json::from_str(r#"{"forecastHorizonDays": 3}"#).expect("options json");
        assert_eq!(options.moving_average_window, 7);
        assert_eq!(options.forecast_horizon_days, 3);
        assert!(options.include_forecast);
    }
}
