use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{data::Scalar, numeric::round_to};

pub const DEFAULT_TOP_VALUES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueFrequency {
    pub value: String,
    pub count: usize,
    pub percent: f64,
}

/// Counts occurrences of the present (non-missing) values of one column.
#[derive(Debug, Default)]
pub struct FrequencyAccumulator {
    total: usize,
    counts: HashMap<String, usize>,
}

impl FrequencyAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&mut self, value: Option<&Scalar>) {
        let Some(value) = value.filter(|v| !v.is_missing()) else {
            return;
        };
        self.total += 1;
        *self.counts.entry(value.as_display()).or_insert(0) += 1;
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Most frequent values, count descending with ties broken by value.
    /// `top == 0` returns every distinct value.
    pub fn top_values(&self, top: usize) -> Vec<ValueFrequency> {
        if self.total == 0 {
            return Vec::new();
        }
        let mut items = self.counts.iter().collect::<Vec<_>>();
        items.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        if top > 0 && items.len() > top {
            items.truncate(top);
        }
        items
            .into_iter()
            .map(|(value, &count)| ValueFrequency {
                value: value.clone(),
                count,
                percent: round_to(count as f64 / self.total as f64 * 100.0, 2),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulator_skips_missing_and_orders_by_count() {
        let mut accumulator = FrequencyAccumulator::new();
        for value in ["b", "a", "", "b", "c", "a", "b"] {
            accumulator.ingest(Some(&Scalar::text(value)));
        }
        accumulator.ingest(None);
        accumulator.ingest(Some(&Scalar::Null));

        assert_eq!(accumulator.total(), 6);
        assert_eq!(accumulator.distinct(), 3);
        let top = accumulator.top_values(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].value, "b");
        assert_eq!(top[0].count, 3);
        assert_eq!(top[0].percent, 50.0);
        assert_eq!(top[1].value, "a");
    }

    #[test]
    fn ties_are_broken_by_value() {
        let mut accumulator = FrequencyAccumulator::new();
        for value in ["z", "y", "x"] {
            accumulator.ingest(Some(&Scalar::text(value)));
        }
        let values = accumulator
            .top_values(0)
            .into_iter()
            .map(|f| f.value)
            .collect::<Vec<_>>();
        assert_eq!(values, vec!["x", "y", "z"]);
    }

    #[test]
    fn empty_accumulator_has_no_top_values() {
        assert!(FrequencyAccumulator::new().top_values(5).is_empty());
    }
}
