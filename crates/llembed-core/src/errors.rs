//! Embedding error types.
//!
//! Every error is terminal for the invocation: the binaries print one
//! diagnostic and exit with status 1. Nothing here is retried.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Message carried by [`EmbedError::Parse`] when no marker line yields values.
pub const NO_EMBEDDINGS_FOUND: &str = "no embeddings found in output";

/// Errors from any stage of an embedding invocation.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// Missing or invalid command-line input.
    #[error("{0}")]
    Usage(String),

    /// Standard input could not be read.
    #[error("failed to read input: {0}")]
    Input(#[source] std::io::Error),

    /// The model could not be loaded (bad path, unsupported file, rejected config).
    #[error("failed to load model {}: {message}", .path.display())]
    ModelLoad {
        /// Model path that was being loaded.
        path: PathBuf,
        /// Underlying cause.
        message: String,
    },

    /// The engine failed to produce an embedding.
    #[error("failed to generate embeddings: {0}")]
    Embedding(String),

    /// None of the candidate embedding executables exist.
    #[error("embedding binary not found (searched: {})", join_paths(.candidates))]
    BinaryNotFound {
        /// Paths that were checked, in order.
        candidates: Vec<PathBuf>,
    },

    /// The embedding executable could not be run or exited unsuccessfully.
    #[error("failed to run embedding binary: {message}{}", stderr_suffix(.stderr))]
    Process {
        /// What went wrong (spawn failure or exit status).
        message: String,
        /// Captured standard error of the child, if any.
        stderr: String,
    },

    /// No embedding could be recovered from the captured output.
    #[error("failed to parse embeddings output: {0}")]
    Parse(String),

    /// The result could not be serialized.
    #[error("failed to encode output: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The rendered result could not be written to standard output.
    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),
}

impl EmbedError {
    /// Build a [`EmbedError::ModelLoad`] for `path`.
    pub fn model_load(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::ModelLoad {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Short machine-readable category, used as a structured log field.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Usage(_) => "usage",
            Self::Input(_) => "input",
            Self::ModelLoad { .. } => "model_load",
            Self::Embedding(_) => "embedding",
            Self::BinaryNotFound { .. } => "binary_not_found",
            Self::Process { .. } => "process",
            Self::Parse(_) => "parse",
            Self::Encoding(_) => "encoding",
            Self::Output(_) => "output",
        }
    }

    /// Whether the binaries should print their usage text after the message.
    pub const fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\nstderr: {trimmed}")
    }
}

/// Result alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbedError>;
