//! Request and result types.

use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{EmbedError, Result};

/// Host logical CPU count, falling back to 1 when it cannot be determined.
pub fn default_thread_count() -> usize {
    std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

/// One embedding invocation, built once from parsed arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbeddingRequest {
    /// GGUF model file.
    pub model_path: PathBuf,
    /// Text to embed.
    pub text: String,
    /// Threads for the engine's compute pool; 0 leaves the choice to the engine.
    pub thread_count: usize,
    /// Layers offloaded to the GPU.
    pub gpu_layer_count: u32,
}

impl EmbeddingRequest {
    /// Create a request with the host thread count and no GPU offload.
    pub fn new(model_path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            model_path: model_path.into(),
            text: text.into(),
            thread_count: default_thread_count(),
            gpu_layer_count: 0,
        }
    }

    /// Set the thread count.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.thread_count = threads;
        self
    }

    /// Set the GPU layer count.
    #[must_use]
    pub fn with_gpu_layers(mut self, layers: u32) -> Self {
        self.gpu_layer_count = layers;
        self
    }

    /// Thread count with 0 resolved to the host CPU count.
    pub fn effective_threads(&self) -> usize {
        if self.thread_count == 0 {
            default_thread_count()
        } else {
            self.thread_count
        }
    }

    /// Check the request invariants before any engine work starts.
    pub fn validate(&self) -> Result<()> {
        if self.model_path.as_os_str().is_empty() {
            return Err(EmbedError::Usage("model path is required".into()));
        }
        if self.text.trim().is_empty() {
            return Err(EmbedError::Usage("no input text provided".into()));
        }
        Ok(())
    }
}

/// An embedding vector. `dimension` always equals `values.len()`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EmbeddingResult {
    values: Vec<f32>,
    dimension: usize,
}

impl EmbeddingResult {
    /// Wrap a vector, deriving its dimension.
    pub fn new(values: Vec<f32>) -> Self {
        let dimension = values.len();
        Self { values, dimension }
    }

    /// Vector components in engine order.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Number of components.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Consume the result, returning the vector.
    pub fn into_values(self) -> Vec<f32> {
        self.values
    }
}

impl From<Vec<f32>> for EmbeddingResult {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

/// How results are printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma-separated fixed-point decimals.
    #[default]
    Text,
    /// Pretty-printed JSON object.
    Json,
}

impl FromStr for OutputFormat {
    type Err = EmbedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(EmbedError::Usage(format!(
                "unknown output format {other:?} (expected text or json)"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn request_defaults() {
        let req = EmbeddingRequest::new("/m.gguf", "hello");
        assert_eq!(req.thread_count, default_thread_count());
        assert!(req.thread_count >= 1);
        assert_eq!(req.gpu_layer_count, 0);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn request_builders() {
        let req = EmbeddingRequest::new("/m.gguf", "hello")
            .with_threads(3)
            .with_gpu_layers(12);
        assert_eq!(req.thread_count, 3);
        assert_eq!(req.gpu_layer_count, 12);
    }

    #[test]
    fn request_rejects_empty_text() {
        let err = EmbeddingRequest::new("/m.gguf", "  \n\t ").validate().unwrap_err();
        assert_matches!(err, EmbedError::Usage(msg) if msg == "no input text provided");
    }

    #[test]
    fn request_rejects_empty_model_path() {
        let err = EmbeddingRequest::new("", "hello").validate().unwrap_err();
        assert_matches!(err, EmbedError::Usage(msg) if msg == "model path is required");
    }

    #[test]
    fn zero_threads_means_engine_default() {
        let req = EmbeddingRequest::new("/m.gguf", "hello").with_threads(0);
        assert!(req.validate().is_ok());
        assert_eq!(req.effective_threads(), default_thread_count());
        assert_eq!(req.with_threads(5).effective_threads(), 5);
    }

    #[test]
    fn result_dimension_tracks_length() {
        let result = EmbeddingResult::new(vec![0.5, -0.25, 1.0]);
        assert_eq!(result.dimension(), 3);
        assert_eq!(result.values(), &[0.5, -0.25, 1.0]);

        let empty = EmbeddingResult::from(Vec::new());
        assert_eq!(empty.dimension(), 0);
        assert!(empty.into_values().is_empty());
    }

    #[test]
    fn output_format_parse() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(" json ".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().unwrap_err().is_usage());
    }

    #[test]
    fn output_format_display_and_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(
            serde_json::to_value(OutputFormat::Text).unwrap(),
            serde_json::json!("text")
        );
    }
}
