//! # llembed-engine
//!
//! In-process embedding: load a GGUF model once, embed text through it, and
//! release it when the owning [`ModelHandle`] goes away.
//!
//! - [`EmbeddingEngine`] loads models; [`LoadedModel`] computes vectors
//! - [`MockEngine`] produces deterministic SHA-256 vectors for tests
//! - `LlamaEngine` wraps `llama-cpp-2` (feature `llama`)
//! - [`InProcessClient`] adapts a handle to [`llembed_core::EmbeddingClient`]
//!
//! ## Crate Position
//!
//! Depends on: llembed-core, llembed-settings.
//! Depended on by: llembed-cli.

#![deny(unsafe_code)]

pub mod client;
pub mod engine;
pub mod handle;
#[cfg(feature = "llama")]
pub mod llama;
pub mod mock;
pub mod options;

pub use client::InProcessClient;
pub use engine::{EmbeddingEngine, UnavailableEngine, default_engine, ensure_gguf_file};
pub use handle::{LoadedModel, ModelHandle};
#[cfg(feature = "llama")]
pub use llama::LlamaEngine;
pub use mock::MockEngine;
pub use options::{EmbedOptions, LoadOptions, fit_to_hint};
