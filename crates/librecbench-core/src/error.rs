use std::path::PathBuf;

use thiserror::Error;

/// Run-level errors. Any of these aborts the benchmark.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("failed to launch '{}': {source}", program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl BenchError {
    /// Get the error code for machine-readable output
    pub fn error_code(&self) -> &'static str {
        match self {
            BenchError::Launch { .. } => "launch_error",
            BenchError::Config(_) => "invalid_config",
            BenchError::Io(_) => "io_error",
            BenchError::Json(_) => "internal_error",
            BenchError::TomlParse(_) => "invalid_config",
            BenchError::Internal(_) => "internal_error",
        }
    }

    /// Get actionable suggestions for fixing the error
    pub fn suggestions(&self) -> Vec<&'static str> {
        match self {
            BenchError::Launch { source, .. } => match source.kind() {
                std::io::ErrorKind::NotFound => vec![
                    "Check that --executable points at the built recommender binary",
                    "Relative paths are resolved against the current directory",
                ],
                std::io::ErrorKind::PermissionDenied => vec![
                    "Make sure the executable bit is set (chmod +x)",
                ],
                _ => vec![],
            },
            BenchError::Config(msg) if msg.contains("output directory") => vec![
                "Create the output directory first or pass --output-dir",
            ],
            BenchError::TomlParse(_) => vec![
                "Check the --config file; keys mirror the command line flags",
            ],
            _ => vec![],
        }
    }
}

/// Why a single invocation's output was rejected. Only ever drops one sample.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("output is not valid UTF-8")]
    NotUtf8,

    #[error("output is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("output is not a JSON object")]
    NotAnObject,

    #[error("missing metric '{0}'")]
    MissingMetric(String),

    #[error("metric '{0}' is not a number")]
    NonNumeric(String),
}

pub type Result<T> = std::result::Result<T, BenchError>;
