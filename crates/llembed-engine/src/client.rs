//! [`EmbeddingClient`] over a loaded model.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info};

use llembed_core::{EmbedError, EmbeddingClient, EmbeddingRequest, EmbeddingResult, Result};

use crate::engine::EmbeddingEngine;
use crate::handle::ModelHandle;
use crate::options::{EmbedOptions, LoadOptions};

/// In-process client. Owns one [`ModelHandle`] for its whole lifetime.
#[derive(Debug)]
pub struct InProcessClient {
    handle: Mutex<Option<ModelHandle>>,
    dimension_hint: Option<usize>,
}

impl InProcessClient {
    /// Load `path` through `engine` on a blocking thread.
    pub async fn load(
        engine: Arc<dyn EmbeddingEngine>,
        path: PathBuf,
        options: LoadOptions,
    ) -> Result<Self> {
        info!(path = %path.display(), engine = engine.name(), "Loading model");
        let handle = tokio::task::spawn_blocking({
            let path = path.clone();
            move || engine.load(&path, &options)
        })
        .await
        .map_err(|e| EmbedError::model_load(&path, format!("join error: {e}")))??;
        info!("Model loaded successfully");
        Ok(Self::from_handle(handle))
    }

    /// Wrap an already loaded handle.
    pub fn from_handle(handle: ModelHandle) -> Self {
        Self {
            handle: Mutex::new(Some(handle)),
            dimension_hint: None,
        }
    }

    /// Width hint applied to every request.
    #[must_use]
    pub fn with_dimension_hint(mut self, hint: Option<usize>) -> Self {
        self.dimension_hint = hint;
        self
    }

    /// Native width of the loaded model.
    pub fn native_dimension(&self) -> Option<usize> {
        self.handle
            .lock()
            .as_ref()
            .and_then(ModelHandle::native_dimension)
    }

    /// Release the model now instead of at drop.
    pub fn release(&self) {
        if let Some(mut handle) = self.handle.lock().take() {
            handle.free();
        }
    }

    /// Embed with an explicit width hint instead of the configured one.
    pub async fn embed_with_hint(
        &self,
        request: &EmbeddingRequest,
        dimension_hint: Option<usize>,
    ) -> Result<EmbeddingResult> {
        request.validate()?;

        // Move the handle onto the blocking thread and put it back afterwards,
        // so the sync mutex is never held across the await.
        let handle = self
            .handle
            .lock()
            .take()
            .ok_or_else(|| EmbedError::Embedding("model is busy or has been released".into()))?;
        if handle.path() != request.model_path.as_path() {
            debug!(
                loaded = %handle.path().display(),
                requested = %request.model_path.display(),
                "request names a different model path, using the loaded model"
            );
        }

        let text = request.text.clone();
        let options = EmbedOptions {
            threads: request.effective_threads(),
            dimension_hint,
        };
        let (result, handle) = tokio::task::spawn_blocking(move || {
            let r = handle.embed(&text, &options);
            (r, handle)
        })
        .await
        .map_err(|e| EmbedError::Embedding(format!("join error: {e}")))?;

        *self.handle.lock() = Some(handle);
        let values = result?;
        info!(
            dimensions = values.len(),
            "Embeddings generated successfully ({} dimensions)",
            values.len()
        );
        Ok(EmbeddingResult::new(values))
    }
}

#[async_trait]
impl EmbeddingClient for InProcessClient {
    async fn embed(&self, request: &EmbeddingRequest) -> Result<EmbeddingResult> {
        self.embed_with_hint(request, self.dimension_hint).await
    }

    fn name(&self) -> &'static str {
        "in-process"
    }
}
