//! Application state and event handling

use std::io::{self, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use ratatui::Terminal;

use librecbench_core::report::RunReport;
use librecbench_core::{
    BenchConfig, BenchError, BenchmarkRunner, ParseError, Result, RunObserver, RunOutcome, Sample,
    SystemLauncher,
};

use crate::dashboard::{ChannelObserver, Dashboard, ProgressEvent};
use crate::signal;
use crate::ui::{self, UiState};

/// Interactive dashboard around a benchmark run
pub struct App {
    config: BenchConfig,
    dashboard: Dashboard,
    ui_state: UiState,
    stop_flag: Arc<AtomicBool>,
    result: Option<Result<RunOutcome>>,
    should_quit: bool,
}

impl App {
    pub fn new(config: BenchConfig) -> Self {
        let dashboard = Dashboard::new(config.iterations, &config.required_metrics);
        Self {
            config,
            dashboard,
            ui_state: UiState::default(),
            stop_flag: Arc::new(AtomicBool::new(false)),
            result: None,
            should_quit: false,
        }
    }

    /// Run the TUI until the benchmark ends and the user quits.
    ///
    /// Returns the runner's outcome; a launch failure returns immediately.
    /// Nothing is launched unless the terminal could be set up.
    pub fn run(mut self) -> Result<RunOutcome> {
        let mut terminal = setup_terminal()?;

        let rx = match self.start_benchmark() {
            Ok(rx) => rx,
            Err(e) => {
                let _ = restore_terminal(&mut terminal);
                return Err(e);
            }
        };

        let loop_result = self.event_loop(&mut terminal, &rx);
        if loop_result.is_err() {
            // Don't leave the runner launching after the UI is gone
            self.stop_flag.store(true, Ordering::SeqCst);
        }

        restore_terminal(&mut terminal)?;
        loop_result?;

        match self.result.take() {
            Some(result) => result,
            // Quit before the runner reported back; wait for it between iterations
            None => wait_for_result(&rx),
        }
    }

    fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>, rx: &Receiver<ProgressEvent>) -> Result<()> {
        let tick_rate = Duration::from_millis(100);
        let mut last_tick = Instant::now();

        loop {
            self.drain_events(rx);

            if matches!(self.result, Some(Err(_))) {
                return Ok(());
            }

            terminal.draw(|frame| {
                ui::draw(frame, &self.config, &self.dashboard, &self.ui_state);
            })?;

            // Handle input with timeout
            let timeout = tick_rate.saturating_sub(last_tick.elapsed());
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }

            if last_tick.elapsed() >= tick_rate {
                last_tick = Instant::now();
            }

            if self.should_quit && self.result.is_some() {
                return Ok(());
            }
        }
    }

    fn drain_events(&mut self, rx: &Receiver<ProgressEvent>) {
        while let Ok(event) = rx.try_recv() {
            match event {
                ProgressEvent::Finished(result) => {
                    self.dashboard.finish(&result);
                    self.result = Some(*result);
                }
                other => self.dashboard.apply(other),
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.request_quit();
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.request_quit();
            }
            KeyCode::Left | KeyCode::Char('h') => {
                let max = self.dashboard.metrics.len();
                self.ui_state.select_metric(-1, max);
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => {
                let max = self.dashboard.metrics.len();
                self.ui_state.select_metric(1, max);
            }
            _ => {}
        }
    }

    /// First quit stops the run after the current iteration; once the run
    /// is over the app exits.
    fn request_quit(&mut self) {
        self.should_quit = true;
        if self.result.is_none() {
            self.stop_flag.store(true, Ordering::SeqCst);
            self.dashboard.stopping();
        }
    }

    fn start_benchmark(&mut self) -> Result<Receiver<ProgressEvent>> {
        let runner = BenchmarkRunner::new(self.config.clone(), SystemLauncher)?
            .with_stop_flag(Arc::clone(&self.stop_flag));
        let (tx, rx) = mpsc::channel();

        thread::Builder::new()
            .name("recbench-runner".to_string())
            .spawn(move || {
                let mut observer = ChannelObserver::new(tx.clone());
                let result = runner.run_with(&mut observer);
                let _ = tx.send(ProgressEvent::Finished(Box::new(result)));
            })?;

        self.dashboard.log_event(format!(
            "Started {} iterations of {}",
            self.config.iterations,
            self.config.executable.display()
        ));

        Ok(rx)
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = stdout.execute(EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e.into());
    }
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    Ok(())
}

fn wait_for_result(rx: &Receiver<ProgressEvent>) -> Result<RunOutcome> {
    for event in rx.iter() {
        if let ProgressEvent::Finished(result) = event {
            return *result;
        }
    }
    Err(BenchError::Internal("benchmark runner exited without a result".to_string()))
}

/// Prints progress on a single line
struct HeadlessProgress {
    total: usize,
    collected: usize,
    dropped: usize,
}

impl HeadlessProgress {
    fn print(&self, iteration: usize) {
        print!(
            "\rProgress: {}/{} ({:.1}%) - {} collected, {} dropped",
            iteration,
            self.total,
            (iteration as f64 / self.total as f64) * 100.0,
            self.collected,
            self.dropped
        );
        io::stdout().flush().ok();
    }
}

impl RunObserver for HeadlessProgress {
    fn sample_collected(&mut self, sample: &Sample) {
        self.collected += 1;
        self.print(sample.iteration + 1);
    }

    fn sample_dropped(&mut self, iteration: usize, _reason: &ParseError) {
        self.dropped += 1;
        self.print(iteration + 1);
    }
}

/// Run benchmark in headless mode (no TUI)
pub fn run_headless(config: &BenchConfig) -> Result<RunOutcome> {
    let stop_flag = Arc::new(AtomicBool::new(false));
    signal::spawn_interrupt_watcher(Arc::clone(&stop_flag))?;

    let runner = BenchmarkRunner::new(config.clone(), SystemLauncher)?.with_stop_flag(stop_flag);

    println!("Running benchmark with query: '{}'", config.query);
    println!("Iterations: {}", config.iterations);

    let mut progress = HeadlessProgress {
        total: config.iterations,
        collected: 0,
        dropped: 0,
    };
    let outcome = runner.run_with(&mut progress)?;
    println!();

    Ok(outcome)
}

/// Print the per-metric summary table
pub fn print_summary(report: &RunReport) {
    println!("\nBenchmark Results:");
    println!("{}", "=".repeat(50));
    println!(
        "Samples: {} collected, {} dropped, {} attempted ({})",
        report.config.attempted - report.config.dropped,
        report.config.dropped,
        report.config.attempted,
        report.config.stop_reason.as_str()
    );

    for (metric, summary) in &report.analysis {
        println!("\n{}:", metric);
        match summary {
            Some(stats) => {
                println!("  Mean: {:.2}", stats.mean);
                println!("  Std Dev: {:.2}", stats.std);
                println!("  95th percentile: {:.2}", stats.p95);
                println!("  99th percentile: {:.2}", stats.p99);
                println!("  Min: {:.2}", stats.min);
                println!("  Max: {:.2}", stats.max);
            }
            None => println!("  no data"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runner_gone_without_result_is_internal_error() {
        let (tx, rx) = mpsc::channel();
        assert!(tx.send(ProgressEvent::IterationStarted { iteration: 0, total: 3 }).is_ok());
        drop(tx);

        let err = wait_for_result(&rx).unwrap_err();
        assert!(matches!(err, BenchError::Internal(_)));
        assert_eq!(err.error_code(), "internal_error");
    }
}
