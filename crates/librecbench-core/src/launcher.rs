//! Process launching capability

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{BenchError, Result};

/// Everything captured from one finished child process
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Captured {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Exit code, `None` when the child was terminated by a signal
    pub exit_code: Option<i32>,
}

impl Captured {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs a program to completion and captures its output.
///
/// Implementations block until the child has exited. A child that runs but
/// fails is not an error here; only failing to start it is.
pub trait Launcher {
    fn launch(&self, program: &Path, args: &[String]) -> Result<Captured>;
}

/// Launcher backed by `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&self, program: &Path, args: &[String]) -> Result<Captured> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| BenchError::Launch {
                program: program.to_path_buf(),
                source,
            })?;

        Ok(Captured {
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: output.status.code(),
        })
    }
}

impl<L: Launcher + ?Sized> Launcher for &L {
    fn launch(&self, program: &Path, args: &[String]) -> Result<Captured> {
        (**self).launch(program, args)
    }
}

impl<L: Launcher + ?Sized> Launcher for Box<L> {
    fn launch(&self, program: &Path, args: &[String]) -> Result<Captured> {
        (**self).launch(program, args)
    }
}
