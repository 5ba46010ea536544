mod common;

use common::usage_series;
use sheet_insight::{InsightError, TrendOptions, UsageRecord, analyze_usage_trend};

#[test]
fn three_day_series_forecasts_two_days() {
    let options = TrendOptions {
        moving_average_window: 7,
        forecast_horizon_days: 2,
        include_forecast: true,
    };
    let points = analyze_usage_trend(&usage_series(&[10, 20, 30]), &options).expect("trend");

    let averages = points
        .iter()
        .filter_map(|p| p.moving_average_calls)
        .collect::<Vec<_>>();
    assert_eq!(averages, vec![10, 15, 20]);

    let forecast = points
        .iter()
        .filter(|p| p.is_forecast)
        .map(|p| (p.date.as_str(), p.forecast_total_calls))
        .collect::<Vec<_>>();
    assert_eq!(
        forecast,
        vec![("2024-01-04", Some(50)), ("2024-01-05", Some(60))]
    );
}

#[test]
fn idle_days_report_zero_rates() {
    let records = usage_series(&[0, 0, 0, 0]);
    let points = analyze_usage_trend(&records, &TrendOptions::default()).expect("trend");
    for point in points.iter().filter(|p| !p.is_forecast) {
        assert_eq!(point.success_rate, Some(0));
        assert_eq!(point.fallback_rate, Some(0));
        assert_eq!(point.moving_average_calls, Some(0));
    }
    assert!(
        points
            .iter()
            .filter_map(|p| p.forecast_total_calls)
            .all(|v| v == 0)
    );
}

#[test]
fn daily_rates_are_rounded_percentages() {
    let records = vec![
        UsageRecord::new("2024-05-01", 3).with_outcomes(2, 1),
        UsageRecord::new("2024-05-02", 8).with_outcomes(7, 1),
    ];
    let options = TrendOptions {
        include_forecast: false,
        ..TrendOptions::default()
    };
    let points = analyze_usage_trend(&records, &options).expect("trend");
    assert_eq!(points[0].success_rate, Some(67));
    assert_eq!(points[0].fallback_rate, Some(33));
    assert_eq!(points[1].success_rate, Some(88));
    assert_eq!(points[1].fallback_rate, Some(13));
}

#[test]
fn output_length_tracks_forecast_settings() {
    let records = usage_series(&[5, 8, 13, 21, 34]);
    let default = analyze_usage_trend(&records, &TrendOptions::default()).expect("trend");
    assert_eq!(default.len(), records.len() + 7);

    let no_horizon = TrendOptions {
        forecast_horizon_days: 0,
        ..TrendOptions::default()
    };
    assert_eq!(
        analyze_usage_trend(&records, &no_horizon)
            .expect("trend")
            .len(),
        records.len()
    );

    let disabled = TrendOptions {
        include_forecast: false,
        ..TrendOptions::default()
    };
    assert_eq!(
        analyze_usage_trend(&records, &disabled)
            .expect("trend")
            .len(),
        records.len()
    );
}

#[test]
fn empty_series_is_empty() {
    let points = analyze_usage_trend(&[], &TrendOptions::default()).expect("trend");
    assert!(points.is_empty());
}

#[test]
fn negative_options_are_invalid_arguments() {
    let negative_window = TrendOptions {
        moving_average_window: -3,
        ..TrendOptions::default()
    };
    let err = analyze_usage_trend(&usage_series(&[1, 2, 3]), &negative_window)
        .expect_err("negative window");
    assert!(matches!(err, InsightError::InvalidArgument { .. }));
    assert!(err.to_string().contains("movingAverageWindow"));
}

#[test]
fn forecast_points_serialize_null_metrics() {
    let points = analyze_usage_trend(&usage_series(&[1, 2, 3]), &TrendOptions {
        forecast_horizon_days: 1,
        ..TrendOptions::default()
    })
    .expect("trend");
    let json = serde_json::to_value(&points).expect("json");
    let real = &json[0];
    assert_eq!(real["totalCalls"], 1);
    assert_eq!(real["isForecast"], false);
    assert!(real["forecastTotalCalls"].is_null());

    let forecast = &json[3];
    assert_eq!(forecast["isForecast"], true);
    assert!(forecast["totalCalls"].is_null());
    assert!(forecast["movingAverageCalls"].is_null());
    assert!(forecast["successRate"].is_null());
    assert_eq!(forecast["forecastTotalCalls"], 5);
}

#[test]
fn forecast_crosses_month_boundaries() {
    let records = vec![
        UsageRecord::new("2024-02-27", 10),
        UsageRecord::new("2024-02-28", 10),
        UsageRecord::new("2024-02-29", 10),
    ];
    let points = analyze_usage_trend(&records, &TrendOptions {
        forecast_horizon_days: 2,
        ..TrendOptions::default()
    })
    .expect("trend");
    assert_eq!(points[3].date, "2024-03-01");
    assert_eq!(points[4].date, "2024-03-02");
    assert_eq!(points[3].forecast_total_calls, Some(10));
}

#[test]
fn records_are_not_modified() {
    let records = usage_series(&[4, 5, 6]);
    let snapshot = records.clone();
    let _ = analyze_usage_trend(&records, &TrendOptions::default()).expect("trend");
    assert_eq!(records, snapshot);
}

#[test]
fn extreme_counters_do_not_overflow() {
    let records = vec![
        UsageRecord::new("2024-01-01", u64::MAX),
        UsageRecord::new("2024-01-02", 1),
        UsageRecord::new("2024-01-03", 1),
    ];
    let points = analyze_usage_trend(&records, &TrendOptions::default()).expect("trend");
    assert_eq!(points.len(), records.len() + 7);
    assert_eq!(points[0].moving_average_calls, Some(u64::MAX));
    assert!(points[1].moving_average_calls.is_some_and(|v| v > 0));
}

#[test]
fn non_iso_dates_keep_the_forecast_horizon() {
    let records = vec![
        UsageRecord::new("Mon", 10),
        UsageRecord::new("Tue", 20),
        UsageRecord::new("Wed", 30),
    ];
    let points = analyze_usage_trend(&records, &TrendOptions {
        forecast_horizon_days: 2,
        ..TrendOptions::default()
    })
    .expect("trend");
    let forecast = points
        .iter()
        .filter(|p| p.is_forecast)
        .map(|p| p.forecast_total_calls)
        .collect::<Vec<_>>();
    assert_eq!(points.len(), 5);
    assert_eq!(forecast, vec![Some(50), Some(60)]);
}
