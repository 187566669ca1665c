//! Benchmark runner - drives sequential invocations of the recommender

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::BenchConfig;
use crate::error::{BenchError, ParseError, Result};
use crate::launcher::Launcher;
use crate::sample::{Sample, SampleSet};

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Completed,
    Interrupted,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::Completed => "completed",
            StopReason::Interrupted => "interrupted",
        }
    }
}

/// Result of a finished (or interrupted) run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub samples: SampleSet,
    pub stop_reason: StopReason,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunOutcome {
    pub fn interrupted(&self) -> bool {
        self.stop_reason == StopReason::Interrupted
    }
}

/// Progress callbacks. Called from the runner's thread, in iteration order.
pub trait RunObserver {
    fn iteration_started(&mut self, _iteration: usize, _total: usize) {}
    fn sample_collected(&mut self, _sample: &Sample) {}
    fn sample_dropped(&mut self, _iteration: usize, _reason: &ParseError) {}
    /// The child ran but exited unsuccessfully; `None` when killed by a signal
    fn child_failed(&mut self, _iteration: usize, _exit_code: Option<i32>) {}
    fn launch_failed(&mut self, _iteration: usize, _error: &BenchError) {}
}

/// Observer that ignores everything
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Runs `<executable> --benchmark <query>` the configured number of times,
/// one invocation at a time.
pub struct BenchmarkRunner<L> {
    config: BenchConfig,
    launcher: L,
    stop_flag: Arc<AtomicBool>,
}

impl<L: Launcher> BenchmarkRunner<L> {
    /// Create a runner; fails if the configuration is invalid
    pub fn new(config: BenchConfig, launcher: L) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            launcher,
            stop_flag: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Use an externally owned stop flag (e.g. one set by a signal handler)
    pub fn with_stop_flag(mut self, stop_flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = stop_flag;
        self
    }

    /// Handle that stops the run between iterations when set
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_flag)
    }

    /// Request a stop before the next iteration
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Run without progress reporting
    pub fn run(&self) -> Result<RunOutcome> {
        self.run_with(&mut NoopObserver)
    }

    /// Run all iterations, reporting progress to `observer`.
    ///
    /// A launch failure aborts the run. Unparseable output drops only that
    /// iteration's sample. A stop request ends the loop before the next
    /// invocation and keeps everything collected so far.
    pub fn run_with(&self, observer: &mut dyn RunObserver) -> Result<RunOutcome> {
        let started_at = Utc::now();
        let total = self.config.iterations;
        let args = self.config.invocation_args();
        let mut samples = SampleSet::new();
        let mut stop_reason = StopReason::Completed;

        info!(
            executable = %self.config.executable.display(),
            query = %self.config.query,
            iterations = total,
            "starting benchmark"
        );

        for iteration in 0..total {
            if self.stop_flag.load(Ordering::SeqCst) {
                info!(iteration, collected = samples.len(), "benchmark interrupted");
                stop_reason = StopReason::Interrupted;
                break;
            }

            observer.iteration_started(iteration, total);
            let start = Instant::now();

            let captured = match self.launcher.launch(&self.config.executable, &args) {
                Ok(captured) => captured,
                Err(e) => {
                    observer.launch_failed(iteration, &e);
                    return Err(e);
                }
            };
            let wall_time = start.elapsed();

            if !captured.success() {
                warn!(iteration, exit_code = ?captured.exit_code, "recommender exited unsuccessfully");
                observer.child_failed(iteration, captured.exit_code);
            }
            if !captured.stderr.is_empty() {
                let stderr = String::from_utf8_lossy(&captured.stderr);
                debug!(iteration, stderr = %stderr.trim_end(), "recommender stderr");
            }

            match Sample::parse(iteration, &captured.stdout, &self.config.required_metrics, wall_time) {
                Ok(sample) => {
                    debug!(iteration, wall_ms = wall_time.as_secs_f64() * 1000.0, "sample collected");
                    observer.sample_collected(&sample);
                    samples.push(sample);
                }
                Err(reason) => {
                    warn!(iteration, %reason, "error parsing output, dropping sample");
                    observer.sample_dropped(iteration, &reason);
                    samples.record_dropped();
                }
            }
        }

        info!(
            collected = samples.len(),
            dropped = samples.dropped(),
            stop_reason = stop_reason.as_str(),
            "benchmark finished"
        );

        Ok(RunOutcome {
            samples,
            stop_reason,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launcher::Captured;
    use std::cell::{Cell, RefCell};
    use std::path::Path;

    const GOOD: &str = r#"{"query_time": 10, "memory_usage": 5, "groq_latency": 2}"#;

    /// Replays scripted stdout, optionally raising the stop flag after a number of calls
    struct ScriptedLauncher {
        outputs: Vec<&'static str>,
        calls: Cell<usize>,
        seen_args: RefCell<Vec<Vec<String>>>,
        stop_after: Option<(usize, Arc<AtomicBool>)>,
        exit_code: i32,
    }

    impl ScriptedLauncher {
        fn new(outputs: Vec<&'static str>) -> Self {
            Self {
                outputs,
                calls: Cell::new(0),
                seen_args: RefCell::new(Vec::new()),
                stop_after: None,
                exit_code: 0,
            }
        }
    }

    impl Launcher for ScriptedLauncher {
        fn launch(&self, _program: &Path, args: &[String]) -> Result<Captured> {
            let n = self.calls.get();
            self.calls.set(n + 1);
            self.seen_args.borrow_mut().push(args.to_vec());
            if let Some((limit, flag)) = &self.stop_after {
                if n + 1 == *limit {
                    flag.store(true, Ordering::SeqCst);
                }
            }
            let out = self.outputs[n % self.outputs.len()];
            Ok(Captured {
                stdout: out.as_bytes().to_vec(),
                stderr: Vec::new(),
                exit_code: Some(self.exit_code),
            })
        }
    }

    struct FailingLauncher;

    impl Launcher for FailingLauncher {
        fn launch(&self, program: &Path, _args: &[String]) -> Result<Captured> {
            Err(BenchError::Launch {
                program: program.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }
    }

    #[derive(Default)]
    struct Recorder {
        started: Vec<usize>,
        collected: Vec<usize>,
        dropped: Vec<usize>,
        failed: Vec<(usize, Option<i32>)>,
    }

    impl RunObserver for Recorder {
        fn iteration_started(&mut self, iteration: usize, _total: usize) {
            self.started.push(iteration);
        }
        fn sample_collected(&mut self, sample: &Sample) {
            self.collected.push(sample.iteration);
        }
        fn sample_dropped(&mut self, iteration: usize, _reason: &ParseError) {
            self.dropped.push(iteration);
        }
        fn child_failed(&mut self, iteration: usize, exit_code: Option<i32>) {
            self.failed.push((iteration, exit_code));
        }
    }

    fn config(iterations: usize) -> BenchConfig {
        let mut config = BenchConfig::new("./recommender");
        config.iterations = iterations;
        config
    }

    #[test]
    fn test_collects_one_sample_per_iteration() {
        for n in [1, 5, 17] {
            let runner = BenchmarkRunner::new(config(n), ScriptedLauncher::new(vec![GOOD])).unwrap();
            let outcome = runner.run().unwrap();
            assert_eq!(outcome.samples.len(), n);
            assert_eq!(outcome.samples.attempted(), n);
            assert_eq!(outcome.stop_reason, StopReason::Completed);
        }
    }

    #[test]
    fn test_malformed_iterations_are_dropped() {
        let launcher = ScriptedLauncher::new(vec![GOOD, GOOD, "segfault?", GOOD, GOOD]);
        let runner = BenchmarkRunner::new(config(5), launcher).unwrap();
        let mut recorder = Recorder::default();
        let outcome = runner.run_with(&mut recorder).unwrap();

        assert_eq!(outcome.samples.len(), 4);
        assert_eq!(outcome.samples.dropped(), 1);
        assert_eq!(recorder.dropped, vec![2]);
        assert_eq!(recorder.collected, vec![0, 1, 3, 4]);
        assert_eq!(recorder.started, vec![0, 1, 2, 3, 4]);
        assert_eq!(outcome.samples.values("query_time"), vec![10.0; 4]);
    }

    #[test]
    fn test_unsuccessful_exit_is_reported_and_sample_kept() {
        let mut launcher = ScriptedLauncher::new(vec![GOOD]);
        launcher.exit_code = 2;
        let runner = BenchmarkRunner::new(config(2), launcher).unwrap();
        let mut recorder = Recorder::default();
        let outcome = runner.run_with(&mut recorder).unwrap();

        assert_eq!(recorder.failed, vec![(0, Some(2)), (1, Some(2))]);
        assert_eq!(outcome.samples.len(), 2);
    }

    #[test]
    fn test_forwards_benchmark_flag_and_query() {
        let mut cfg = config(2);
        cfg.query = "cozy mysteries set in Scotland".to_string();
        let runner = BenchmarkRunner::new(cfg, ScriptedLauncher::new(vec![GOOD])).unwrap();
        runner.run().unwrap();

        let seen = runner.launcher.seen_args.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], vec!["--benchmark", "cozy mysteries set in Scotland"]);
    }

    #[test]
    fn test_launch_failure_aborts() {
        let runner = BenchmarkRunner::new(config(5), FailingLauncher).unwrap();
        assert!(matches!(runner.run(), Err(BenchError::Launch { .. })));
    }

    #[test]
    fn test_stop_keeps_partial_samples() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut launcher = ScriptedLauncher::new(vec![GOOD]);
        launcher.stop_after = Some((3, Arc::clone(&flag)));

        let runner = BenchmarkRunner::new(config(10), launcher)
            .unwrap()
            .with_stop_flag(flag);
        let outcome = runner.run().unwrap();

        assert!(outcome.interrupted());
        assert_eq!(outcome.samples.len(), 3);
        assert_eq!(runner.launcher.calls.get(), 3);
    }

    #[test]
    fn test_stop_before_start_runs_nothing() {
        let runner = BenchmarkRunner::new(config(4), ScriptedLauncher::new(vec![GOOD])).unwrap();
        runner.stop();
        let outcome = runner.run().unwrap();
        assert!(outcome.interrupted());
        assert!(outcome.samples.is_empty());
        assert_eq!(runner.launcher.calls.get(), 0);
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let result = BenchmarkRunner::new(config(0), ScriptedLauncher::new(vec![GOOD]));
        assert!(matches!(result, Err(BenchError::Config(_))));
    }
}
