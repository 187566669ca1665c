//! Live view of a running benchmark, fed by runner progress events

use std::collections::{BTreeMap, VecDeque};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use librecbench_core::{BenchError, MetricSummary, ParseError, Result, RunObserver, RunOutcome, Sample};

/// Messages sent from the runner thread to the UI thread
pub enum ProgressEvent {
    IterationStarted { iteration: usize, total: usize },
    Collected(Sample),
    Dropped { iteration: usize, reason: String },
    ChildFailed { iteration: usize, exit_code: Option<i32> },
    LaunchFailed(String),
    Finished(Box<Result<RunOutcome>>),
}

/// Forwards runner callbacks over a channel
pub struct ChannelObserver {
    tx: Sender<ProgressEvent>,
}

impl ChannelObserver {
    pub fn new(tx: Sender<ProgressEvent>) -> Self {
        Self { tx }
    }
}

impl RunObserver for ChannelObserver {
    fn iteration_started(&mut self, iteration: usize, total: usize) {
        let _ = self.tx.send(ProgressEvent::IterationStarted { iteration, total });
    }

    fn sample_collected(&mut self, sample: &Sample) {
        let _ = self.tx.send(ProgressEvent::Collected(sample.clone()));
    }

    fn sample_dropped(&mut self, iteration: usize, reason: &ParseError) {
        let _ = self.tx.send(ProgressEvent::Dropped {
            iteration,
            reason: reason.to_string(),
        });
    }

    fn child_failed(&mut self, iteration: usize, exit_code: Option<i32>) {
        let _ = self.tx.send(ProgressEvent::ChildFailed { iteration, exit_code });
    }

    fn launch_failed(&mut self, _iteration: usize, error: &BenchError) {
        let _ = self.tx.send(ProgressEvent::LaunchFailed(error.to_string()));
    }
}

/// Run status shown in the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Stopping,
    Complete,
    Interrupted,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "Running",
            RunStatus::Stopping => "Stopping",
            RunStatus::Complete => "Complete",
            RunStatus::Interrupted => "Interrupted",
            RunStatus::Failed => "Failed",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, RunStatus::Complete | RunStatus::Interrupted | RunStatus::Failed)
    }
}

/// Per-metric state
pub struct MetricView {
    pub values: Vec<f64>,
    pub summary: Option<MetricSummary>,
}

/// Everything the UI draws
pub struct Dashboard {
    pub total: usize,
    pub current: Option<usize>,
    pub collected: usize,
    pub dropped: usize,
    pub metrics: BTreeMap<String, MetricView>,
    pub wall_times_ms: VecDeque<u64>,
    pub status: RunStatus,
    event_log: EventLog,
    start_time: Instant,
    finished_after: Option<Duration>,
}

const WALL_TIME_HISTORY: usize = 120;

impl Dashboard {
    pub fn new(total: usize, required: &[String]) -> Self {
        let metrics = required
            .iter()
            .map(|name| {
                (
                    name.clone(),
                    MetricView {
                        values: Vec::new(),
                        summary: None,
                    },
                )
            })
            .collect();

        Self {
            total,
            current: None,
            collected: 0,
            dropped: 0,
            metrics,
            wall_times_ms: VecDeque::with_capacity(WALL_TIME_HISTORY),
            status: RunStatus::Running,
            event_log: EventLog::new(100),
            start_time: Instant::now(),
            finished_after: None,
        }
    }

    /// Fold a progress event into the view
    pub fn apply(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::IterationStarted { iteration, total } => {
                self.current = Some(iteration);
                self.total = total;
            }
            ProgressEvent::Collected(sample) => {
                self.collected += 1;
                self.push_wall_time(sample.wall_time);
                for (name, value) in sample.metrics {
                    let view = self.metrics.entry(name).or_insert_with(|| MetricView {
                        values: Vec::new(),
                        summary: None,
                    });
                    view.values.push(value);
                    view.summary = MetricSummary::from_values(&view.values);
                }
            }
            ProgressEvent::Dropped { iteration, reason } => {
                self.dropped += 1;
                self.log_event(format!("Iteration {} dropped: {}", iteration + 1, reason));
            }
            ProgressEvent::ChildFailed { iteration, exit_code } => {
                let status = match exit_code {
                    Some(code) => format!("status {}", code),
                    None => "a signal".to_string(),
                };
                self.log_event(format!("Iteration {}: recommender exited with {}", iteration + 1, status));
            }
            ProgressEvent::LaunchFailed(message) => {
                self.status = RunStatus::Failed;
                self.log_event(message);
            }
            ProgressEvent::Finished(result) => self.finish(&result),
        }
    }

    /// Record the runner's final result
    pub fn finish(&mut self, result: &Result<RunOutcome>) {
        self.finished_after = Some(self.start_time.elapsed());
        match result {
            Ok(outcome) if outcome.interrupted() => {
                self.status = RunStatus::Interrupted;
                self.log_event(format!(
                    "Benchmark interrupted after {} samples",
                    outcome.samples.len()
                ));
            }
            Ok(outcome) => {
                self.status = RunStatus::Complete;
                self.log_event(format!(
                    "Benchmark complete: {} samples, {} dropped",
                    outcome.samples.len(),
                    outcome.samples.dropped()
                ));
            }
            Err(e) => {
                self.status = RunStatus::Failed;
                self.log_event(format!("Benchmark failed: {}", e));
            }
        }
    }

    /// Mark that a stop was requested and the current iteration is draining
    pub fn stopping(&mut self) {
        if self.status == RunStatus::Running {
            self.status = RunStatus::Stopping;
            self.log_event("Stop requested, finishing current iteration".to_string());
        }
    }

    pub fn log_event(&mut self, message: String) {
        self.event_log.add(message);
    }

    pub fn recent_events(&self) -> Vec<String> {
        self.event_log.recent()
    }

    pub fn metric(&self, index: usize) -> Option<(&String, &MetricView)> {
        self.metrics.iter().nth(index)
    }

    /// Iterations that reached the parse step
    pub fn attempted(&self) -> usize {
        self.collected + self.dropped
    }

    pub fn drop_rate(&self) -> f64 {
        if self.attempted() == 0 {
            0.0
        } else {
            (self.dropped as f64 / self.attempted() as f64) * 100.0
        }
    }

    pub fn progress_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.attempted() as f64 / self.total as f64).min(1.0)
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.finished_after.unwrap_or_else(|| self.start_time.elapsed())
    }

    pub fn mean_wall_time_ms(&self) -> f64 {
        if self.wall_times_ms.is_empty() {
            0.0
        } else {
            self.wall_times_ms.iter().sum::<u64>() as f64 / self.wall_times_ms.len() as f64
        }
    }

    fn push_wall_time(&mut self, wall_time: Duration) {
        self.wall_times_ms.push_back(wall_time.as_millis() as u64);
        if self.wall_times_ms.len() > WALL_TIME_HISTORY {
            self.wall_times_ms.pop_front();
        }
    }
}

/// Event log (circular buffer)
pub struct EventLog {
    entries: VecDeque<String>,
    max_entries: usize,
}

impl EventLog {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries),
            max_entries,
        }
    }

    pub fn add(&mut self, entry: String) {
        self.entries.push_back(entry);
        if self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    pub fn recent(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}
