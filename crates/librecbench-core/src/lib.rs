//! Core library for recbench
//!
//! Drives an external recommender executable repeatedly, parses the metrics
//! each invocation prints, and turns them into summary statistics and a
//! persisted report.
//!
//! - [`runner`] runs the invocation loop
//! - [`launcher`] abstracts starting a process and capturing its output
//! - [`sample`] parses output into samples
//! - [`stats`] computes mean, std, min, max, p95 and p99
//! - [`report`] writes the JSON report and plot data

pub mod config;
pub mod error;
pub mod launcher;
pub mod report;
pub mod runner;
pub mod sample;
pub mod stats;

pub use config::{load_file_config, BenchConfig, FileConfig};
pub use error::{BenchError, ParseError, Result};
pub use launcher::{Captured, Launcher, SystemLauncher};
pub use report::{write_plot_data, write_report, RunReport};
pub use runner::{BenchmarkRunner, NoopObserver, RunObserver, RunOutcome, StopReason};
pub use sample::{Sample, SampleSet};
pub use stats::{summarize, MetricSummary, Summaries};
