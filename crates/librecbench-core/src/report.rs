//! Persisted benchmark artifacts
//!
//! A run produces one JSON report with three sections (`config`, `results`,
//! `analysis`) and, optionally, per-metric plot data for an external plotter.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::BenchConfig;
use crate::error::{BenchError, Result};
use crate::runner::{RunOutcome, StopReason};
use crate::sample::SampleSet;
use crate::stats::{self, HistogramBin, PercentilePoint, Summaries};

/// File name of the report inside the output directory
pub const REPORT_FILE: &str = "benchmark_results.json";

/// Configuration section of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub run_id: String,
    #[serde(flatten)]
    pub bench: BenchConfig,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stop_reason: StopReason,
    /// Iterations that ran to the parse step
    pub attempted: usize,
    /// Iterations whose output was rejected
    pub dropped: usize,
}

/// The full report document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub config: ReportConfig,
    /// Raw values per metric, in iteration order
    pub results: BTreeMap<String, Vec<f64>>,
    /// Summary per metric; `null` when the metric has no data
    pub analysis: Summaries,
}

impl RunReport {
    /// Build the report for a finished run, computing the summaries
    pub fn new(config: &BenchConfig, outcome: &RunOutcome) -> Self {
        let analysis = stats::summarize(&outcome.samples, &config.required_metrics);
        let mut results = outcome.samples.by_metric();
        for name in analysis.keys() {
            results.entry(name.clone()).or_default();
        }

        Self {
            config: ReportConfig {
                run_id: Uuid::new_v4().to_string(),
                bench: config.clone(),
                started_at: outcome.started_at,
                finished_at: outcome.finished_at,
                stop_reason: outcome.stop_reason,
                attempted: outcome.samples.attempted(),
                dropped: outcome.samples.dropped(),
            },
            results,
            analysis,
        }
    }
}

/// Write the report into `dir`, which the caller must have created.
///
/// Returns the path of the written file.
pub fn write_report(dir: &Path, report: &RunReport) -> Result<PathBuf> {
    ensure_dir(dir)?;
    let path = dir.join(REPORT_FILE);
    let json = serde_json::to_string_pretty(report)?;
    fs::write(&path, json)?;
    info!(path = %path.display(), "report written");
    Ok(path)
}

/// Read a report back
pub fn read_report(path: &Path) -> Result<RunReport> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Plot data for one metric's distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionData {
    pub metric: String,
    pub bins: Vec<HistogramBin>,
}

/// Plot data for one metric's percentile curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileData {
    pub metric: String,
    pub points: Vec<PercentilePoint>,
}

/// Write `<metric>_distribution.json` and `<metric>_percentiles.json` for
/// every metric with at least one value. Returns the written paths.
pub fn write_plot_data(dir: &Path, samples: &SampleSet, bins: usize) -> Result<Vec<PathBuf>> {
    ensure_dir(dir)?;
    let mut written = Vec::new();

    for (metric, values) in samples.by_metric() {
        if values.is_empty() {
            continue;
        }
        let stem = file_stem(&metric);

        let distribution = DistributionData {
            metric: metric.clone(),
            bins: stats::histogram(&values, bins),
        };
        let path = dir.join(format!("{}_distribution.json", stem));
        fs::write(&path, serde_json::to_string_pretty(&distribution)?)?;
        written.push(path);

        let percentiles = PercentileData {
            metric: metric.clone(),
            points: stats::percentile_curve(&values),
        };
        let path = dir.join(format!("{}_percentiles.json", stem));
        fs::write(&path, serde_json::to_string_pretty(&percentiles)?)?;
        written.push(path);

        debug!(metric = %metric, values = values.len(), "plot data written");
    }

    Ok(written)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(BenchError::Config(format!(
            "output directory does not exist: {}",
            dir.display()
        )));
    }
    Ok(())
}

fn file_stem(metric: &str) -> String {
    metric
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
