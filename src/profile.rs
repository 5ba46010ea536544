//! Dataset profiling: column classification, missing and duplicate counts,
//! descriptive statistics, and the derived insight list.
//!
//! Profiling never fails. Values that do not parse as numbers are left out of
//! the statistics, rows missing a key count that key as missing, and an empty
//! dataset yields a zeroed profile.

use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    data::{Row, is_missing, parse_numeric},
    frequency::{DEFAULT_TOP_VALUES, FrequencyAccumulator, ValueFrequency},
    insights::{Insight, generate_insights},
    numeric,
};

/// Number of leading rows inspected when classifying a column.
pub const CLASSIFICATION_SAMPLE_ROWS: usize = 100;
/// Share of sampled values that must parse as numbers for a numeric column.
pub const NUMERIC_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericStats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
    pub count: usize,
}

impl NumericStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mean = numeric::mean(values)?;
        let median = numeric::median(values)?;
        let std_dev = numeric::population_std_dev(values)?;
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        Some(Self {
            mean,
            median,
            min,
            max,
            std_dev,
            count: values.len(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    pub missing_count: usize,
    pub numeric_stats: Option<NumericStats>,
    pub distinct_count: usize,
    pub top_values: Vec<ValueFrequency>,
}

impl ColumnProfile {
    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnKind::Numeric
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetProfile {
    pub rows: usize,
    pub columns: usize,
    pub column_profiles: Vec<ColumnProfile>,
    pub duplicate_row_count: usize,
    pub missing_value_count: usize,
    pub completeness_percent: f64,
    pub insights: Vec<Insight>,
}

impl DatasetProfile {
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.column_profiles
            .iter()
            .filter(|c| c.is_numeric())
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn categorical_columns(&self) -> Vec<&str> {
        self.column_profiles
            .iter()
            .filter(|c| !c.is_numeric())
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Missing cells as a percentage of `rows × columns`; zero for an empty grid.
    pub fn missing_percent(&self) -> f64 {
        let cells = self.rows * self.columns;
        if cells == 0 {
            0.0
        } else {
            self.missing_value_count as f64 / cells as f64 * 100.0
        }
    }
}

/// Profiles `rows` without modifying them.
pub fn profile_dataset(rows: &[Row]) -> DatasetProfile {
    let names = column_names(rows);
    let column_profiles = names
        .iter()
        .map(|name| profile_column(name, rows))
        .collect::<Vec<_>>();
    let duplicate_row_count = count_duplicate_rows(rows);
    let missing_value_count = column_profiles.iter().map(|c| c.missing_count).sum();

    let mut profile = DatasetProfile {
        rows: rows.len(),
        columns: names.len(),
        column_profiles,
        duplicate_row_count,
        missing_value_count,
        completeness_percent: 100.0,
        insights: Vec::new(),
    };
    profile.completeness_percent = numeric::round_to(100.0 - profile.missing_percent(), 1);
    profile.insights = generate_insights(&profile);

    debug!(
        "Profiled {} row(s) x {} column(s): {} numeric, {} duplicate(s), {} insight(s)",
        profile.rows,
        profile.columns,
        profile.numeric_columns().len(),
        profile.duplicate_row_count,
        profile.insights.len()
    );
    profile
}

/// Union of row keys in first-seen order.
pub fn column_names(rows: &[Row]) -> Vec<String> {
    let (_, ordered) = rows.iter().flat_map(Row::keys).fold(
        (HashSet::new(), Vec::new()),
        |(mut seen, mut ordered), key| {
            if seen.insert(key) {
                ordered.push(key.to_string());
            }
            (seen, ordered)
        },
    );
    ordered
}

/// Classifies a column from a prefix sample of at most
/// [`CLASSIFICATION_SAMPLE_ROWS`] rows. Only present values take part in the
/// ratio; a sample with no present values is categorical.
pub fn classify_column(name: &str, rows: &[Row]) -> ColumnKind {
    let sample = &rows[..rows.len().min(CLASSIFICATION_SAMPLE_ROWS)];
    let (present, numeric_hits) = sample
        .iter()
        .filter_map(|row| row.get(name))
        .filter(|value| !value.is_missing())
        .fold((0usize, 0usize), |(present, hits), value| {
            let hit = usize::from(parse_numeric(value).is_some());
            (present + 1, hits + hit)
        });
    if present > 0 && numeric_hits as f64 / present as f64 > NUMERIC_THRESHOLD {
        ColumnKind::Numeric
    } else {
        ColumnKind::Categorical
    }
}

/// Rows whose canonical form already appeared earlier in the input.
pub fn count_duplicate_rows(rows: &[Row]) -> usize {
    let (_, duplicates) = rows.iter().fold(
        (HashSet::new(), 0usize),
        |(mut seen, duplicates), row| {
            if seen.insert(row.canonical_key()) {
                (seen, duplicates)
            } else {
                (seen, duplicates + 1)
            }
        },
    );
    duplicates
}

fn profile_column(name: &str, rows: &[Row]) -> ColumnProfile {
    let kind = classify_column(name, rows);
    let missing_count = rows.iter().filter(|row| is_missing(row.get(name))).count();

    let mut frequencies = FrequencyAccumulator::new();
    for row in rows {
        frequencies.ingest(row.get(name));
    }

    let numeric_stats = match kind {
        ColumnKind::Numeric => {
            let values = rows
                .iter()
                .filter_map(|row| row.get(name))
                .filter_map(parse_numeric)
                .collect::<Vec<_>>();
            NumericStats::from_values(&values)
        }
        ColumnKind::Categorical => None,
    };
    let top_values = match kind {
        ColumnKind::Numeric => Vec::new(),
        ColumnKind::Categorical => frequencies.top_values(DEFAULT_TOP_VALUES),
    };

    ColumnProfile {
        name: name.to_string(),
        kind,
        missing_count,
        numeric_stats,
        distinct_count: frequencies.distinct(),
        top_values,
    }
}
