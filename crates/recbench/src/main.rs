//! recbench - benchmark harness for the book recommender

mod app;
mod dashboard;
mod signal;
mod ui;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use app::App;
use librecbench_core::report::{write_plot_data, write_report, RunReport};
use librecbench_core::{load_file_config, BenchConfig, BenchError, Result, StopReason};

/// Log file written next to the report when the TUI is active
const TUI_LOG_FILE: &str = "recbench.log";

#[derive(Parser)]
#[command(name = "recbench")]
#[command(about = "Benchmark the book recommender executable")]
#[command(version)]
struct Cli {
    /// Path to the recommender executable
    #[arg(short = 'e', long)]
    executable: Option<PathBuf>,

    /// Query to benchmark [default: "fantasy books with magic"]
    #[arg(short = 'q', long)]
    query: Option<String>,

    /// Number of iterations [default: 100]
    #[arg(short = 'n', long)]
    iterations: Option<usize>,

    /// Output directory for results [default: benchmark_results]
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// TOML file with defaults for the options above
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence.
    /// Logs go to stderr in headless mode, else to recbench.log in the output directory
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Non-interactive mode (no TUI)
    #[arg(long)]
    headless: bool,

    /// Skip writing per-metric plot data files
    #[arg(long)]
    no_plot_data: bool,
}

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(StopReason::Completed) => {}
        Ok(StopReason::Interrupted) => {
            eprintln!("\nBenchmark interrupted by user");
            std::process::exit(1);
        }
        Err(e) => {
            output_error(&e);
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<StopReason> {
    let config = build_config(cli)?;
    config.validate()?;

    // The report writer only writes into directories that already exist
    std::fs::create_dir_all(&config.output_dir)?;

    if cli.headless {
        init_logging(&cli.log_level, None);
    } else {
        let log_file = File::create(config.output_dir.join(TUI_LOG_FILE))?;
        init_logging(&cli.log_level, Some(log_file));
    }

    let outcome = if cli.headless {
        app::run_headless(&config)?
    } else {
        App::new(config.clone()).run()?
    };

    let report = RunReport::new(&config, &outcome);
    let path = write_report(&config.output_dir, &report)?;
    if !cli.no_plot_data {
        write_plot_data(&config.output_dir, &outcome.samples, config.histogram_bins)?;
    }

    app::print_summary(&report);
    println!("\nResults saved to {}", path.display());

    Ok(outcome.stop_reason)
}

/// Defaults, then the config file, then command line flags
fn build_config(cli: &Cli) -> Result<BenchConfig> {
    let file = match &cli.config {
        Some(path) => Some(load_file_config(path)?),
        None => None,
    };

    let executable = cli
        .executable
        .clone()
        .or_else(|| file.as_ref().and_then(|f| f.executable.clone()))
        .ok_or_else(|| BenchError::Config("--executable is required".to_string()))?;

    let mut config = BenchConfig::new(executable);
    if let Some(file) = file {
        config.apply_file(file);
    }
    if let Some(ref executable) = cli.executable {
        config.executable = executable.clone();
    }
    if let Some(ref query) = cli.query {
        config.query = query.clone();
    }
    if let Some(iterations) = cli.iterations {
        config.iterations = iterations;
    }
    if let Some(ref output_dir) = cli.output_dir {
        config.output_dir = output_dir.clone();
    }

    Ok(config)
}

/// The TUI owns the terminal, so its logs go to a file instead of stderr
fn init_logging(level: &str, log_file: Option<File>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match log_file {
        Some(file) => registry
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .init(),
        None => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn output_error(err: &BenchError) {
    eprintln!("error: {}", err);
    for suggestion in err.suggestions() {
        eprintln!("  hint: {}", suggestion);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "recbench",
            "--executable",
            "./build/recommender",
            "--iterations",
            "12",
            "--query",
            "hard sci-fi",
        ]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.executable, PathBuf::from("./build/recommender"));
        assert_eq!(config.iterations, 12);
        assert_eq!(config.query, "hard sci-fi");
        assert_eq!(config.output_dir, PathBuf::from("benchmark_results"));
    }

    #[test]
    fn test_executable_required() {
        let cli = Cli::parse_from(["recbench", "--headless"]);
        assert!(matches!(build_config(&cli), Err(BenchError::Config(_))));
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.toml");
        std::fs::write(
            &path,
            "executable = \"/opt/rec/bin/recommender\"\niterations = 50\nquery = \"poetry\"\n",
        )
        .unwrap();

        let cli = Cli::parse_from([
            "recbench",
            "--config",
            path.to_str().unwrap(),
            "--iterations",
            "3",
        ]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.executable, PathBuf::from("/opt/rec/bin/recommender"));
        assert_eq!(config.iterations, 3);
        assert_eq!(config.query, "poetry");
    }
}
