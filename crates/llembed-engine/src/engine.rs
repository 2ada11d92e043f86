//! Engine trait and the engine selected at build time.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use llembed_core::{EmbedError, Result};

use crate::handle::ModelHandle;
use crate::options::LoadOptions;

const GGUF_MAGIC: &[u8; 4] = b"GGUF";

/// Loads GGUF models into [`ModelHandle`]s.
///
/// `load` blocks for as long as the model takes to read; async callers go
/// through [`crate::InProcessClient::load`].
pub trait EmbeddingEngine: Send + Sync {
    /// Load the model at `path`.
    fn load(&self, path: &Path, options: &LoadOptions) -> Result<ModelHandle>;

    /// Engine name for logs.
    fn name(&self) -> &'static str;
}

/// Check that `path` is a readable file starting with the GGUF magic.
pub fn ensure_gguf_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(EmbedError::model_load(path, "model file not found"));
    }
    let mut magic = [0u8; 4];
    std::fs::File::open(path)
        .and_then(|mut f| f.read_exact(&mut magic))
        .map_err(|e| EmbedError::model_load(path, format!("cannot read model file: {e}")))?;
    if &magic != GGUF_MAGIC {
        return Err(EmbedError::model_load(path, "not a GGUF model file"));
    }
    Ok(())
}

/// Engine for builds without native inference. Every load fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableEngine;

impl EmbeddingEngine for UnavailableEngine {
    fn load(&self, path: &Path, _options: &LoadOptions) -> Result<ModelHandle> {
        Err(EmbedError::model_load(
            path,
            "in-process inference is not compiled in (rebuild with the `llama` feature)",
        ))
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}

/// The engine this build ships with.
#[cfg(feature = "llama")]
pub fn default_engine() -> Arc<dyn EmbeddingEngine> {
    Arc::new(crate::llama::LlamaEngine::new())
}

/// The engine this build ships with.
#[cfg(not(feature = "llama"))]
pub fn default_engine() -> Arc<dyn EmbeddingEngine> {
    Arc::new(UnavailableEngine)
}
