//! Owned model handle.
//!
//! A [`ModelHandle`] owns exactly one loaded model. The model is released
//! once, either through [`ModelHandle::free`] or when the handle drops.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use llembed_core::{EmbedError, Result};

use crate::options::EmbedOptions;

/// A model resident in memory.
pub trait LoadedModel: Send {
    /// Embed `text`. The result width is the engine's business; both bundled
    /// engines apply [`crate::fit_to_hint`].
    fn embed(&self, text: &str, options: &EmbedOptions) -> Result<Vec<f32>>;

    /// Width of vectors the model produces without a hint.
    fn native_dimension(&self) -> usize;
}

/// Exclusive owner of a loaded model.
pub struct ModelHandle {
    path: PathBuf,
    embeddings: bool,
    model: Option<Box<dyn LoadedModel>>,
}

impl ModelHandle {
    /// Wrap a freshly loaded model.
    pub fn new(path: impl Into<PathBuf>, embeddings: bool, model: Box<dyn LoadedModel>) -> Self {
        Self {
            path: path.into(),
            embeddings,
            model: Some(model),
        }
    }

    /// Path the model was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the model is still resident.
    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Native vector width, if the model is still resident.
    pub fn native_dimension(&self) -> Option<usize> {
        self.model.as_ref().map(|m| m.native_dimension())
    }

    /// Embed `text` through the resident model.
    pub fn embed(&self, text: &str, options: &EmbedOptions) -> Result<Vec<f32>> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| EmbedError::Embedding("model has been released".into()))?;
        if !self.embeddings {
            return Err(EmbedError::Embedding(
                "model was loaded without embedding output".into(),
            ));
        }
        if text.is_empty() {
            return Err(EmbedError::Embedding("input text is empty".into()));
        }
        if options.threads == 0 {
            return Err(EmbedError::Embedding("thread count must be positive".into()));
        }
        model.embed(text, options)
    }

    /// Release the model. Later calls are no-ops.
    pub fn free(&mut self) {
        if self.model.take().is_some() {
            debug!(path = %self.path.display(), "model released");
        }
    }
}

impl Drop for ModelHandle {
    fn drop(&mut self) {
        self.free();
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("path", &self.path)
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}
