//! llama.cpp engine (feature-gated behind `llama`).
//!
//! The backend is initialized once per process and shared by every model
//! this engine loads. Each embed call builds a fresh context, decodes the
//! whole input as one sequence, and reads the pooled sequence embedding.

use std::num::NonZeroU32;
use std::path::Path;
use std::sync::Arc;

use llama_cpp_2::context::params::LlamaContextParams;
use llama_cpp_2::llama_backend::LlamaBackend;
use llama_cpp_2::llama_batch::LlamaBatch;
use llama_cpp_2::model::params::LlamaModelParams;
use llama_cpp_2::model::{AddBos, LlamaModel};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use llembed_core::{EmbedError, Result, l2_normalize};

use crate::engine::{EmbeddingEngine, ensure_gguf_file};
use crate::handle::{LoadedModel, ModelHandle};
use crate::options::{EmbedOptions, LoadOptions, fit_to_hint};

/// Engine backed by `llama-cpp-2`.
#[derive(Default)]
pub struct LlamaEngine {
    backend: Mutex<Option<Arc<LlamaBackend>>>,
}

impl LlamaEngine {
    /// Engine with a lazily initialized backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn backend(&self, path: &Path) -> Result<Arc<LlamaBackend>> {
        let mut slot = self.backend.lock();
        if let Some(backend) = slot.as_ref() {
            return Ok(Arc::clone(backend));
        }
        let backend = Arc::new(
            LlamaBackend::init()
                .map_err(|e| EmbedError::model_load(path, format!("backend init: {e}")))?,
        );
        *slot = Some(Arc::clone(&backend));
        Ok(backend)
    }
}

impl EmbeddingEngine for LlamaEngine {
    fn load(&self, path: &Path, options: &LoadOptions) -> Result<ModelHandle> {
        ensure_gguf_file(path)?;
        let context_size = NonZeroU32::new(options.context_size)
            .ok_or_else(|| EmbedError::model_load(path, "context size must be positive"))?;
        if !options.f16_memory {
            warn!("f32 KV cache is not selectable here, keeping the f16 default");
        }

        let backend = self.backend(path)?;
        let params = LlamaModelParams::default().with_n_gpu_layers(options.gpu_layers);
        let model = LlamaModel::load_from_file(&backend, path, &params)
            .map_err(|e| EmbedError::model_load(path, e.to_string()))?;

        info!(
            path = %path.display(),
            n_embd = model.n_embd(),
            gpu_layers = options.gpu_layers,
            "llama model loaded"
        );
        let loaded = LlamaModelState {
            model,
            backend,
            context_size,
        };
        Ok(ModelHandle::new(path, options.embeddings, Box::new(loaded)))
    }

    fn name(&self) -> &'static str {
        "llama"
    }
}

/// Field order matters: the model drops before the backend it was loaded on.
struct LlamaModelState {
    model: LlamaModel,
    backend: Arc<LlamaBackend>,
    context_size: NonZeroU32,
}

impl LlamaModelState {
    fn embed_native(&self, text: &str, threads: usize) -> Result<Vec<f32>> {
        let n_ctx = self.context_size.get();
        let threads = i32::try_from(threads).unwrap_or(i32::MAX);
        let ctx_params = LlamaContextParams::default()
            .with_n_ctx(Some(self.context_size))
            .with_n_batch(n_ctx)
            .with_n_ubatch(n_ctx)
            .with_n_threads(threads)
            .with_n_threads_batch(threads)
            .with_embeddings(true);
        let mut ctx = self
            .model
            .new_context(&self.backend, ctx_params)
            .map_err(|e| EmbedError::Embedding(format!("context: {e}")))?;

        let tokens = self
            .model
            .str_to_token(text, AddBos::Always)
            .map_err(|e| EmbedError::Embedding(format!("tokenize: {e}")))?;
        if tokens.is_empty() {
            return Err(EmbedError::Embedding("input produced no tokens".into()));
        }
        if tokens.len() > n_ctx as usize {
            return Err(EmbedError::Embedding(format!(
                "input is {} tokens, context holds {n_ctx}",
                tokens.len()
            )));
        }
        debug!(tokens = tokens.len(), "decoding input");

        let mut batch = LlamaBatch::new(tokens.len(), 1);
        batch
            .add_sequence(&tokens, 0, false)
            .map_err(|e| EmbedError::Embedding(format!("batch: {e}")))?;
        ctx.decode(&mut batch)
            .map_err(|e| EmbedError::Embedding(format!("decode: {e}")))?;

        // Models without a pooling head only expose per-token outputs.
        let values = match ctx.embeddings_seq_ith(0) {
            Ok(pooled) => pooled.to_vec(),
            Err(err) => {
                debug!(error = %err, "no pooled embedding, using last token");
                let last = i32::try_from(tokens.len() - 1).unwrap_or(i32::MAX);
                ctx.embeddings_ith(last)
                    .map_err(|e| EmbedError::Embedding(format!("embeddings: {e}")))?
                    .to_vec()
            }
        };
        Ok(values)
    }
}

impl LoadedModel for LlamaModelState {
    fn embed(&self, text: &str, options: &EmbedOptions) -> Result<Vec<f32>> {
        let mut values = self.embed_native(text, options.threads)?;
        l2_normalize(&mut values);
        Ok(fit_to_hint(values, options.dimension_hint))
    }

    fn native_dimension(&self) -> usize {
        usize::try_from(self.model.n_embd()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_rejects_missing_file_before_backend_init() {
        let engine = LlamaEngine::new();
        let err = engine
            .load(Path::new("does/not/exist.gguf"), &LoadOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), "model_load");
        assert!(engine.backend.lock().is_none());
    }

    #[test]
    fn llama_engine_is_an_engine() {
        fn assert_engine<T: EmbeddingEngine>() {}
        assert_engine::<LlamaEngine>();
        assert_eq!(LlamaEngine::new().name(), "llama");
    }
}
