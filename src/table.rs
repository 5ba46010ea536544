use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{
    data::format_number,
    profile::{ColumnKind, DatasetProfile},
    summary::UsageSummary,
    trend::TrendPoint,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

pub fn render_table(headers: &[&str], aligns: &[Align], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(sanitize_cell(cell).chars().count());
        }
    }

    let mut output = String::new();
    let header_cells = headers.iter().map(|h| h.to_string()).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&header_cells, &widths, aligns));
    let separator = widths.iter().map(|w| "-".repeat((*w).max(3))).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths, aligns));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths, aligns));
    }
    output
}

fn format_row(values: &[String], widths: &[usize], aligns: &[Align]) -> String {
    let line = values
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(idx, (value, &width))| {
            let cell = sanitize_cell(value);
            match aligns.get(idx).copied().unwrap_or(Align::Left) {
                Align::Left => format!("{cell:<width$}"),
                Align::Right => format!("{cell:>width$}"),
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

fn format_metric(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.4}")
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn render_profile(profile: &DatasetProfile) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "rows: {}  columns: {}  duplicates: {}  missing: {}  complete: {:.1}%",
        profile.rows,
        profile.columns,
        profile.duplicate_row_count,
        profile.missing_value_count,
        profile.completeness_percent
    );
    let _ = writeln!(output);

    let rows = profile
        .column_profiles
        .iter()
        .map(|column| {
            let stats = column.numeric_stats.as_ref();
            let metric = |f: fn(&crate::profile::NumericStats) -> f64| {
                stats.map(|s| format_metric(f(s))).unwrap_or_default()
            };
            let top = column
                .top_values
                .first()
                .map(|v| format!("{} ({})", v.value, v.count))
                .unwrap_or_default();
            vec![
                column.name.clone(),
                match column.kind {
                    ColumnKind::Numeric => "numeric".to_string(),
                    ColumnKind::Categorical => "categorical".to_string(),
                },
                column.missing_count.to_string(),
                optional(stats.map(|s| s.count)),
                metric(|s| s.min),
                metric(|s| s.max),
                metric(|s| s.mean),
                metric(|s| s.median),
                metric(|s| s.std_dev),
                top,
            ]
        })
        .collect::<Vec<_>>();
    output.push_str(&render_table(
        &[
            "column", "kind", "missing", "count", "min", "max", "mean", "median", "std_dev", "top",
        ],
        &[
            Align::Left,
            Align::Left,
            Align::Right,
            Align::Right,
            Align::Right,
            Align::Right,
            Align::Right,
            Align::Right,
            Align::Right,
            Align::Left,
        ],
        &rows,
    ));

    for insight in &profile.insights {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "[{:?}] {} ({})",
            insight.kind, insight.title, insight.category
        );
        let _ = writeln!(output, "  {}", insight.description);
        let _ = writeln!(output, "  -> {}", insight.recommendation);
    }
    output
}

pub fn render_trend(points: &[TrendPoint]) -> String {
    let rows = points
        .iter()
        .map(|p| {
            vec![
                p.date.clone(),
                optional(p.total_calls),
                optional(p.success_rate.map(|r| format!("{r}%"))),
                optional(p.fallback_rate.map(|r| format!("{r}%"))),
                optional(p.moving_average_calls),
                optional(p.avg_latency_ms.map(format_number)),
                optional(p.forecast_total_calls),
            ]
        })
        .collect::<Vec<_>>();
    render_table(
        &[
            "date",
            "calls",
            "success",
            "fallback",
            "moving_avg",
            "latency_ms",
            "forecast",
        ],
        &[
            Align::Left,
            Align::Right,
            Align::Right,
            Align::Right,
            Align::Right,
            Align::Right,
            Align::Right,
        ],
        &rows,
    )
}

pub fn render_summary(summary: &UsageSummary) -> String {
    let rows = vec![
        vec!["days".to_string(), summary.days.to_string()],
        vec!["total_calls".to_string(), summary.total_calls.to_string()],
        vec!["success_calls".to_string(), summary.success_calls.to_string()],
        vec!["fallback_calls".to_string(), summary.fallback_calls.to_string()],
        vec!["success_rate".to_string(), format!("{:.2}%", summary.success_rate)],
        vec!["fallback_rate".to_string(), format!("{:.2}%", summary.fallback_rate)],
        vec!["avg_latency_ms".to_string(), summary.avg_latency_ms.to_string()],
    ];
    render_table(&["metric", "value"], &[Align::Left, Align::Right], &rows)
}
