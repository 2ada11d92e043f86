//! [`EmbeddingClient`] over the external executable.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{info, warn};

use llembed_core::{EmbedError, EmbeddingClient, EmbeddingRequest, EmbeddingResult, Result};
use llembed_settings::{OutputContract, ProcessSettings};

use crate::extract::{decode_json_record, extract_embedding};
use crate::locate::locate_binary;
use crate::runner::{ProcessOutput, ProcessRunner, TokioProcessRunner};

/// Where to find the executable and how to read its result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessConfig {
    /// Explicit executable, checked before `candidates`.
    pub binary: Option<PathBuf>,
    /// Relative paths probed in order.
    pub candidates: Vec<PathBuf>,
    /// Result contract.
    pub output: OutputContract,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self::from_settings(&ProcessSettings::default())
    }
}

impl ProcessConfig {
    /// Build from settings.
    pub fn from_settings(s: &ProcessSettings) -> Self {
        Self {
            binary: s.binary.as_ref().map(PathBuf::from),
            candidates: s.candidates.iter().map(PathBuf::from).collect(),
            output: s.output,
        }
    }
}

/// Argument vector for one invocation.
///
/// `-t` and `-ngl` are only passed when positive, leaving the executable's
/// own defaults in place otherwise.
pub fn build_args(request: &EmbeddingRequest, output: OutputContract) -> Vec<String> {
    let mut args = vec![
        "-m".to_string(),
        request.model_path.display().to_string(),
        "-p".to_string(),
        request.text.clone(),
    ];
    if request.thread_count > 0 {
        args.push("-t".into());
        args.push(request.thread_count.to_string());
    }
    if request.gpu_layer_count > 0 {
        args.push("-ngl".into());
        args.push(request.gpu_layer_count.to_string());
    }
    if output == OutputContract::Json {
        args.push("--embd-output-format".into());
        args.push("json".into());
    }
    args
}

/// Subprocess client. A new child is spawned per request.
pub struct ProcessClient<R = TokioProcessRunner> {
    config: ProcessConfig,
    runner: R,
}

impl ProcessClient<TokioProcessRunner> {
    /// Client that spawns real processes.
    pub fn new(config: ProcessConfig) -> Self {
        Self::with_runner(config, TokioProcessRunner)
    }
}

impl<R: ProcessRunner> ProcessClient<R> {
    /// Client over a custom runner.
    pub fn with_runner(config: ProcessConfig, runner: R) -> Self {
        Self { config, runner }
    }

    /// Active configuration.
    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }

    fn decode(&self, output: &ProcessOutput) -> Result<Vec<f32>> {
        if self.config.output == OutputContract::Json {
            if let Some(values) = decode_json_record(&output.stdout) {
                return Ok(values);
            }
            warn!("no JSON embedding record on stdout, scraping console output");
        }
        if let Ok(values) = extract_embedding(&output.stdout) {
            return Ok(values);
        }
        // Some builds log through stderr only.
        warn!("no embeddings found in stdout, trying stderr");
        extract_embedding(&output.stderr)
    }
}

#[async_trait]
impl<R: ProcessRunner> EmbeddingClient for ProcessClient<R> {
    async fn embed(&self, request: &EmbeddingRequest) -> Result<EmbeddingResult> {
        request.validate()?;
        let binary = locate_binary(self.config.binary.as_deref(), &self.config.candidates)?;
        let args = build_args(request, self.config.output);

        info!(binary = %binary.display(), "Running embedding binary");
        let output = self.runner.run(&binary, &args).await?;
        if !output.success() {
            return Err(EmbedError::Process {
                message: format!("{} exited with status {}", binary.display(), output.exit_code),
                stderr: output.stderr,
            });
        }

        let values = self.decode(&output)?;
        info!(
            dimensions = values.len(),
            "Embeddings generated successfully ({} dimensions)",
            values.len()
        );
        Ok(EmbeddingResult::new(values))
    }

    fn name(&self) -> &'static str {
        "process"
    }
}
