//! Benchmark configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};

/// Query used when none is given
pub const DEFAULT_QUERY: &str = "fantasy books with magic";
/// Iterations used when none are given
pub const DEFAULT_ITERATIONS: usize = 100;
/// Output directory used when none is given
pub const DEFAULT_OUTPUT_DIR: &str = "benchmark_results";
/// Histogram bins written to the distribution plot data
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;
/// Keys every invocation must report
pub const DEFAULT_REQUIRED_METRICS: [&str; 3] = ["query_time", "memory_usage", "groq_latency"];

/// Configuration for a benchmark run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Recommender executable, invoked as `<executable> --benchmark <query>`
    pub executable: PathBuf,
    /// Query forwarded verbatim to every invocation
    pub query: String,
    /// Number of sequential invocations
    pub iterations: usize,
    /// Directory receiving the report and plot data
    pub output_dir: PathBuf,
    /// Metrics an invocation must print for its sample to be kept
    pub required_metrics: Vec<String>,
    /// Bin count for distribution plot data
    pub histogram_bins: usize,
}

impl BenchConfig {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            query: DEFAULT_QUERY.to_string(),
            iterations: DEFAULT_ITERATIONS,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            required_metrics: DEFAULT_REQUIRED_METRICS.iter().map(|m| m.to_string()).collect(),
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }

    /// Check the invariants the runner relies on
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(BenchError::Config(
                "iterations must be a positive integer".to_string(),
            ));
        }
        if self.executable.as_os_str().is_empty() {
            return Err(BenchError::Config("executable path is empty".to_string()));
        }
        if self.histogram_bins == 0 {
            return Err(BenchError::Config(
                "histogram_bins must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }

    /// Arguments passed to the executable for one invocation
    pub fn invocation_args(&self) -> Vec<String> {
        vec!["--benchmark".to_string(), self.query.clone()]
    }

    /// Overlay values from a config file. Command line flags are applied after this.
    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(executable) = file.executable {
            self.executable = executable;
        }
        if let Some(query) = file.query {
            self.query = query;
        }
        if let Some(iterations) = file.iterations {
            self.iterations = iterations;
        }
        if let Some(output_dir) = file.output_dir {
            self.output_dir = output_dir;
        }
        if let Some(required) = file.required_metrics {
            self.required_metrics = required;
        }
        if let Some(bins) = file.histogram_bins {
            self.histogram_bins = bins;
        }
    }
}

/// On-disk configuration (TOML). Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_metrics: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub histogram_bins: Option<usize>,
}

/// Load a config file
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Err(BenchError::Config(format!(
            "config file not found: {}",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)?;
    let config: FileConfig = toml::from_str(&content)?;
    Ok(config)
}
