//! Subprocess execution.

use std::path::Path;
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tracing::debug;

use llembed_core::{EmbedError, Result};

/// Captured result of a finished child process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
    /// Exit code; -1 when terminated by a signal.
    pub exit_code: i32,
}

impl ProcessOutput {
    /// Whether the child exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs a program to completion and captures its output.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `program` with `args`. Fails only when the child cannot be spawned
    /// or awaited; a non-zero exit is reported through [`ProcessOutput`].
    async fn run(&self, program: &Path, args: &[String]) -> Result<ProcessOutput>;
}

/// Real subprocess execution backed by `tokio::process::Command`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, program: &Path, args: &[String]) -> Result<ProcessOutput> {
        let start = Instant::now();

        let mut cmd = tokio::process::Command::new(program);
        let _ = cmd
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(program = %program.display(), args = args.len(), "spawning process");

        // Both pipes drain concurrently; nothing is parsed before exit.
        let output = cmd.output().await.map_err(|e| EmbedError::Process {
            message: format!("failed to spawn {}: {e}", program.display()),
            stderr: String::new(),
        })?;

        let exit_code = output.status.code().unwrap_or(-1);
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(program = %program.display(), exit_code, duration_ms, "process completed");

        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code,
        })
    }
}
