use serde::{Deserialize, Serialize};

use crate::{
    numeric::{round_half_up, round_to},
    trend::UsageRecord,
};

/// Totals across a whole usage series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    pub days: usize,
    pub total_calls: u64,
    pub success_calls: u64,
    pub fallback_calls: u64,
    /// Percentage, two decimals.
    pub success_rate: f64,
    /// Percentage, two decimals.
    pub fallback_rate: f64,
    /// Call-weighted mean of the daily latencies.
    pub avg_latency_ms: u64,
}

pub fn summarize_usage(records: &[UsageRecord]) -> UsageSummary {
    let (total_calls, success_calls, fallback_calls, latency_weight) = records.iter().fold(
        (0u64, 0u64, 0u64, 0f64),
        |(total, success, fallback, latency), record| {
            (
                total.saturating_add(record.total_calls),
                success.saturating_add(record.success_calls),
                fallback.saturating_add(record.fallback_calls),
                latency + record.avg_latency_ms * record.total_calls as f64,
            )
        },
    );
    let rate = |part: u64| {
        if total_calls == 0 {
            0.0
        } else {
            round_to(part as f64 / total_calls as f64 * 100.0, 2)
        }
    };
    let avg_latency_ms = if total_calls == 0 {
        0
    } else {
        round_half_up(latency_weight / total_calls as f64).max(0.0) as u64
    };
    UsageSummary {
        days: records.len(),
        total_calls,
        success_calls,
        fallback_calls,
        success_rate: rate(success_calls),
        fallback_rate: rate(fallback_calls),
        avg_latency_ms,
    }
}
