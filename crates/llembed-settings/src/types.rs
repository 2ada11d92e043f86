//! Settings types. Serialized as camelCase; missing fields take defaults.

use serde::{Deserialize, Serialize};

use llembed_core::logging::LogFormat;
use llembed_core::{DEFAULT_PRECISION, OutputFormat, default_thread_count};

use crate::errors::{Result, SettingsError};

/// Relative paths probed for the external embedding executable, in order.
pub const DEFAULT_BINARY_CANDIDATES: &[&str] = &[
    "../build/bin/embedding",
    "./build/bin/embedding",
    "build/bin/embedding",
];

/// Root settings object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbedSettings {
    /// Model loading.
    pub model: ModelSettings,
    /// Per-call inference options.
    pub inference: InferenceSettings,
    /// Subprocess mode.
    pub process: ProcessSettings,
    /// Result rendering.
    pub output: OutputSettings,
    /// Stderr logging.
    pub logging: LoggingSettings,
}

impl EmbedSettings {
    /// Reject values no engine could run with.
    pub fn validate(&self) -> Result<()> {
        if self.model.context_size == 0 {
            return Err(SettingsError::InvalidValue(
                "model.contextSize must be positive".into(),
            ));
        }
        if self.inference.threads == 0 {
            return Err(SettingsError::InvalidValue(
                "inference.threads must be positive".into(),
            ));
        }
        if self.inference.dimension_hint == Some(0) {
            return Err(SettingsError::InvalidValue(
                "inference.dimensionHint must be positive when set".into(),
            ));
        }
        if self.process.candidates.is_empty() && self.process.binary.is_none() {
            return Err(SettingsError::InvalidValue(
                "process.candidates is empty and no process.binary is set".into(),
            ));
        }
        Ok(())
    }
}

/// Model loading options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelSettings {
    /// Default model file when `-m` is not given.
    pub path: Option<String>,
    /// Context window in tokens.
    pub context_size: u32,
    /// Half-precision KV cache.
    pub f16_memory: bool,
    /// Layers offloaded to the GPU.
    pub gpu_layers: u32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            path: None,
            context_size: 2048,
            f16_memory: true,
            gpu_layers: 0,
        }
    }
}

/// Per-call inference options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InferenceSettings {
    /// Compute threads. Defaults to the host logical CPU count, sampled once
    /// when the settings value is built.
    pub threads: usize,
    /// Output width hint passed to the engine (engine-defined effect).
    pub dimension_hint: Option<usize>,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            threads: default_thread_count(),
            dimension_hint: None,
        }
    }
}

/// How the external executable reports its result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputContract {
    /// Scrape the `embedding 0:` console line (compatible with every build).
    #[default]
    Log,
    /// Request `--embd-output-format json` and decode the record.
    Json,
}

/// Subprocess mode options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessSettings {
    /// Explicit executable path, checked before the candidates.
    pub binary: Option<String>,
    /// Relative paths probed in order.
    pub candidates: Vec<String>,
    /// Result contract with the executable.
    pub output: OutputContract,
}

impl Default for ProcessSettings {
    fn default() -> Self {
        Self {
            binary: None,
            candidates: DEFAULT_BINARY_CANDIDATES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            output: OutputContract::Log,
        }
    }
}

/// Result rendering options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputSettings {
    /// Default format when `-format` is not given.
    pub format: OutputFormat,
    /// Fractional digits in text output.
    pub precision: usize,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            precision: DEFAULT_PRECISION,
        }
    }
}

/// Stderr logging options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    pub level: String,
    /// Line format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Compact,
        }
    }
}
