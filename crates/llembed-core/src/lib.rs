//! # llembed-core
//!
//! Shared vocabulary for the llembed programs:
//!
//! - **Types**: [`EmbeddingRequest`], [`EmbeddingResult`], [`OutputFormat`]
//! - **Errors**: [`EmbedError`] taxonomy via `thiserror`
//! - **Input**: [`resolve_input`] (prompt flag or drained stdin)
//! - **Output**: [`render`] to comma-separated text or pretty JSON
//! - **Client seam**: [`EmbeddingClient`], implemented in-process by
//!   `llembed-engine` and over a subprocess by `llembed-process`
//! - **Logging**: `tracing` subscriber setup and log capture for tests
//!
//! ## Crate Position
//!
//! Standalone (no llembed crate dependencies).
//! Depended on by: every other llembed crate.

#![deny(unsafe_code)]

pub mod client;
pub mod errors;
pub mod input;
pub mod logging;
pub mod normalize;
pub mod render;
pub mod types;

pub use client::EmbeddingClient;
pub use errors::{EmbedError, Result};
pub use input::{STDIN_HINT, resolve_input};
pub use normalize::{cosine_similarity, l2_norm, l2_normalize};
pub use render::{DEFAULT_PRECISION, render, render_json, render_text};
pub use types::{EmbeddingRequest, EmbeddingResult, OutputFormat, default_thread_count};
