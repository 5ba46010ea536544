//! Numeric helpers shared by the profiler and the trend analyzer.

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Middle value of the sorted values; the average of the two middle values
/// when the count is even.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len().is_multiple_of(2) {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Population standard deviation (divides by `n`, not `n - 1`).
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let variance = values
        .iter()
        .map(|value| {
            let delta = value - mean;
            delta * delta
        })
        .sum::<f64>()
        / values.len() as f64;
    Some(variance.max(0.0).sqrt())
}

/// Rounds half-way cases towards positive infinity, matching how the
/// dashboard rounds rates and forecasts (`2.5 -> 3`, `-2.5 -> -2`).
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Rounds to `digits` decimal places.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

/// Ordinary least squares fit of `y` against its index `x = 0, 1, 2, ...`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn fit(ys: &[f64]) -> Option<Self> {
        if ys.is_empty() {
            return None;
        }
        let n = ys.len() as f64;
        let (sum_x, sum_y, sum_xy, sum_xx) = ys.iter().enumerate().fold(
            (0.0, 0.0, 0.0, 0.0),
            |(sx, sy, sxy, sxx), (idx, &y)| {
                let x = idx as f64;
                (sx + x, sy + y, sxy + x * y, sxx + x * x)
            },
        );
        let mut denominator = n * sum_xx - sum_x * sum_x;
        if denominator == 0.0 {
            denominator = 1.0;
        }
        let slope = (n * sum_xy - sum_x * sum_y) / denominator;
        let intercept = (sum_y - slope * sum_x) / n;
        Some(Self { slope, intercept })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}
