//! Summary statistics over collected samples

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sample::SampleSet;

/// Aggregate of one metric across a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
    pub p99: f64,
}

impl MetricSummary {
    /// Summarize a slice of values. `None` when there is nothing to summarize.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let (mean, std) = mean_and_std(values);
        Some(Self {
            mean,
            std,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            p95: interpolate(&sorted, 95.0),
            p99: interpolate(&sorted, 99.0),
        })
    }
}

/// Metric name to summary. `None` means the metric has no data.
pub type Summaries = BTreeMap<String, Option<MetricSummary>>;

/// Summarize every metric of a run.
///
/// Keys are the `expected` metrics plus every metric observed in the
/// samples. A metric without values is reported as `None` rather than zero.
pub fn summarize(samples: &SampleSet, expected: &[String]) -> Summaries {
    let mut by_metric = samples.by_metric();
    let mut summaries = Summaries::new();

    for name in expected {
        by_metric.entry(name.clone()).or_default();
    }

    for (name, values) in by_metric {
        summaries.insert(name, MetricSummary::from_values(&values));
    }

    summaries
}

/// Mean and population standard deviation in one pass (Welford).
///
/// Never sums raw values, so values near `f64::MAX` stay finite.
fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let mut mean = 0.0;
    let mut m2 = 0.0;
    for (i, &value) in values.iter().enumerate() {
        let delta = value - mean;
        mean += delta / (i + 1) as f64;
        m2 += delta * (value - mean);
    }
    (mean, (m2 / values.len() as f64).sqrt())
}

/// Percentile of an ascending slice, interpolating linearly between the two
/// closest ranks. `p` is clamped to `0.0..=100.0`. `None` for an empty slice.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    Some(interpolate(sorted, p))
}

// Caller guarantees `sorted` is non-empty.
fn interpolate(sorted: &[f64], p: f64) -> f64 {
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

/// One equal-width histogram bin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram over `[min, max]`. The last bin is closed on the
/// right. When every value is equal, a single bin holds all of them.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if min == max {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for value in values {
        let idx = (((value - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }

    out
}

/// A point on the percentile curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentilePoint {
    pub percentile: u32,
    pub value: f64,
}

/// Percentiles 1 through 100 of `values`
pub fn percentile_curve(values: &[f64]) -> Vec<PercentilePoint> {
    if values.is_empty() {
        return Vec::new();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    (1..=100)
        .map(|p| PercentilePoint {
            percentile: p,
            value: interpolate(&sorted, p as f64),
        })
        .collect()
}
