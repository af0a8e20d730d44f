//! Historical trend statistics for a single valuation metric.

use crate::types::{MetricTrend, ValuationError, ValuationResult};

/// Summarize a metric series, oldest first. Non-finite entries are skipped.
pub fn metric_trend(values: &[f64]) -> ValuationResult<MetricTrend> {
    let series: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let current = match series.last() {
        Some(v) => *v,
        None => {
            return Err(ValuationError::InsufficientData(
                "trend requires at least one finite observation".to_string(),
            ))
        }
    };

    let mean = mean(&series);
    let min = series.iter().copied().fold(f64::INFINITY, f64::min);
    let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Ok(MetricTrend {
        current,
        mean,
        min,
        max,
        deviation_pct: deviation_pct(current, mean),
        percentile: percentile_of(current, &series),
        observations: series.len(),
    })
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Percent distance of `value` from `mean`; zero when the mean is zero.
pub(crate) fn deviation_pct(value: f64, mean: f64) -> f64 {
    if mean == 0.0 {
        0.0
    } else {
        (value / mean - 1.0) * 100.0
    }
}

/// Share of `values` at or below `value`, in percent.
pub(crate) fn percentile_of(value: f64, values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let at_or_below = values.iter().filter(|v| **v <= value).count();
    at_or_below as f64 / values.len() as f64 * 100.0
}
