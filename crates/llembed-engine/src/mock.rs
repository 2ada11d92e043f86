//! Deterministic engine for tests.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use sha2::{Digest, Sha256};

use llembed_core::{EmbedError, Result, l2_normalize};

use crate::engine::{EmbeddingEngine, ensure_gguf_file};
use crate::handle::{LoadedModel, ModelHandle};
use crate::options::{EmbedOptions, LoadOptions, fit_to_hint};

/// Mock engine.
///
/// Accepts any file with the GGUF magic and produces unit vectors derived
/// from the SHA-256 of the input text.
#[derive(Clone, Debug)]
pub struct MockEngine {
    dims: usize,
    embed_failure: Option<String>,
    loads: Arc<AtomicUsize>,
}

impl MockEngine {
    /// Mock whose models produce `dims`-wide vectors.
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            embed_failure: None,
            loads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Loaded models fail every embed call with `message`.
    #[must_use]
    pub fn with_embed_failure(mut self, message: impl Into<String>) -> Self {
        self.embed_failure = Some(message.into());
        self
    }

    /// Successful loads so far, across clones.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl EmbeddingEngine for MockEngine {
    fn load(&self, path: &Path, options: &LoadOptions) -> Result<ModelHandle> {
        ensure_gguf_file(path)?;
        if options.context_size == 0 {
            return Err(EmbedError::model_load(path, "context size must be positive"));
        }
        let _ = self.loads.fetch_add(1, Ordering::SeqCst);
        let model = MockModel {
            dims: self.dims,
            embed_failure: self.embed_failure.clone(),
        };
        Ok(ModelHandle::new(path, options.embeddings, Box::new(model)))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

struct MockModel {
    dims: usize,
    embed_failure: Option<String>,
}

impl MockModel {
    fn hash_to_vector(&self, text: &str) -> Vec<f32> {
        let hash = Sha256::digest(text.as_bytes());
        let mut v: Vec<f32> = (0..self.dims)
            .map(|i| {
                let byte = hash[i % hash.len()];
                // [-1, 1]
                (f32::from(byte) / 127.5) - 1.0
            })
            .collect();
        l2_normalize(&mut v);
        v
    }
}

impl LoadedModel for MockModel {
    fn embed(&self, text: &str, options: &EmbedOptions) -> Result<Vec<f32>> {
        if let Some(message) = &self.embed_failure {
            return Err(EmbedError::Embedding(message.clone()));
        }
        Ok(fit_to_hint(self.hash_to_vector(text), options.dimension_hint))
    }

    fn native_dimension(&self) -> usize {
        self.dims
    }
}
