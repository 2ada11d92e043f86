//! Load-time and call-time engine options.

use llembed_core::default_thread_count;
use llembed_settings::{InferenceSettings, ModelSettings};

/// Options fixed when a model is loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadOptions {
    /// Half-precision KV cache.
    pub f16_memory: bool,
    /// Context window in tokens.
    pub context_size: u32,
    /// Embedding output; without it every embed call fails.
    pub embeddings: bool,
    /// Layers offloaded to the GPU.
    pub gpu_layers: u32,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            f16_memory: true,
            context_size: 2048,
            embeddings: true,
            gpu_layers: 0,
        }
    }
}

impl LoadOptions {
    /// Build from settings. Embedding output is always requested.
    pub fn from_settings(s: &ModelSettings) -> Self {
        Self {
            f16_memory: s.f16_memory,
            context_size: s.context_size,
            embeddings: true,
            gpu_layers: s.gpu_layers,
        }
    }

    /// Override the GPU layer count.
    #[must_use]
    pub fn with_gpu_layers(mut self, layers: u32) -> Self {
        self.gpu_layers = layers;
        self
    }
}

/// Options for a single embed call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbedOptions {
    /// Compute threads.
    pub threads: usize,
    /// Requested output width. Effect is engine-defined; see [`fit_to_hint`].
    pub dimension_hint: Option<usize>,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            threads: default_thread_count(),
            dimension_hint: None,
        }
    }
}

impl EmbedOptions {
    /// Build from settings.
    pub fn from_settings(s: &InferenceSettings) -> Self {
        Self {
            threads: s.threads,
            dimension_hint: s.dimension_hint,
        }
    }
}

/// Fit a native vector to an optional width hint.
///
/// This is the policy both bundled engines use: no hint keeps the native
/// width, a smaller hint truncates, a larger hint zero-pads. Components are
/// not renormalized after truncation.
pub fn fit_to_hint(mut values: Vec<f32>, hint: Option<usize>) -> Vec<f32> {
    if let Some(width) = hint {
        values.resize(width, 0.0);
    }
    values
}
