//! Heuristic insights derived from a computed [`DatasetProfile`].
//!
//! Each rule is an independent predicate over the profile. Rules are evaluated
//! in table order and every matching rule contributes exactly one insight.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::profile::DatasetProfile;

/// Row count above which a dataset is reported as large.
pub const LARGE_DATASET_ROWS: usize = 1000;
/// Numeric share of columns above which analysis potential is high.
pub const HIGH_POTENTIAL_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Warning,
    Success,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub category: String,
    pub title: String,
    pub description: String,
    pub recommendation: String,
}

impl Insight {
    fn new(
        kind: InsightKind,
        category: &str,
        title: &str,
        description: String,
        recommendation: &str,
    ) -> Self {
        Self {
            kind,
            category: category.to_string(),
            title: title.to_string(),
            description,
            recommendation: recommendation.to_string(),
        }
    }
}

pub type RuleFn = fn(&DatasetProfile) -> Option<Insight>;

#[derive(Clone, Copy)]
pub struct InsightRule {
    pub name: &'static str,
    pub evaluate: RuleFn,
}

pub const INSIGHT_RULES: &[InsightRule] = &[
    InsightRule {
        name: "missing_values",
        evaluate: missing_values,
    },
    InsightRule {
        name: "duplicate_rows",
        evaluate: duplicate_rows,
    },
    InsightRule {
        name: "numeric_columns",
        evaluate: numeric_columns,
    },
    InsightRule {
        name: "large_dataset",
        evaluate: large_dataset,
    },
    InsightRule {
        name: "analysis_potential",
        evaluate: analysis_potential,
    },
];

pub fn generate_insights(profile: &DatasetProfile) -> Vec<Insight> {
    INSIGHT_RULES
        .iter()
        .filter_map(|rule| (rule.evaluate)(profile))
        .collect()
}

pub fn missing_values(profile: &DatasetProfile) -> Option<Insight> {
    if profile.missing_value_count == 0 {
        return None;
    }
    Some(Insight::new(
        InsightKind::Warning,
        "Data Quality",
        "Missing Data Detected",
        format!(
            "{} empty values found ({:.1}% of total data)",
            format_count(profile.missing_value_count),
            profile.missing_percent()
        ),
        "Consider cleaning or filling missing values before analysis",
    ))
}

pub fn duplicate_rows(profile: &DatasetProfile) -> Option<Insight> {
    if profile.duplicate_row_count == 0 {
        return None;
    }
    Some(Insight::new(
        InsightKind::Warning,
        "Data Quality",
        "Duplicate Rows Found",
        format!(
            "{} duplicate rows detected",
            format_count(profile.duplicate_row_count)
        ),
        "Remove duplicates to improve data accuracy",
    ))
}

pub fn numeric_columns(profile: &DatasetProfile) -> Option<Insight> {
    let numeric = profile.numeric_columns();
    if numeric.is_empty() {
        return None;
    }
    Some(Insight::new(
        InsightKind::Success,
        "Data Structure",
        "Numeric Data Available",
        format!(
            "{} numeric columns suitable for mathematical analysis: {}",
            numeric.len(),
            numeric.iter().join(", ")
        ),
        "Use these columns for calculations, charts, and statistical analysis",
    ))
}

pub fn large_dataset(profile: &DatasetProfile) -> Option<Insight> {
    if profile.rows <= LARGE_DATASET_ROWS {
        return None;
    }
    Some(Insight::new(
        InsightKind::Info,
        "Dataset Size",
        "Large Dataset",
        format!(
            "{} rows provide substantial data for analysis",
            format_count(profile.rows)
        ),
        "Consider using pivot tables or aggregations for better performance",
    ))
}

pub fn analysis_potential(profile: &DatasetProfile) -> Option<Insight> {
    if profile.columns == 0 {
        return None;
    }
    let ratio = profile.numeric_columns().len() as f64 / profile.columns as f64;
    if ratio <= HIGH_POTENTIAL_RATIO {
        return None;
    }
    Some(Insight::new(
        InsightKind::Success,
        "Analysis Potential",
        "High Analysis Potential",
        "Majority of columns are numeric, enabling comprehensive statistical analysis".to_string(),
        "Ideal for trend analysis, forecasting, and mathematical modeling",
    ))
}

/// Formats a count with comma thousands separators (`12345 -> "12,345"`).
pub fn format_count(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx).is_multiple_of(3) {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
