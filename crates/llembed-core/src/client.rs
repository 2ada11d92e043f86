//! The inference client seam.

use async_trait::async_trait;

use crate::errors::Result;
use crate::types::{EmbeddingRequest, EmbeddingResult};

/// Anything that can turn an [`EmbeddingRequest`] into a vector.
///
/// Implemented in-process by `llembed_engine::InProcessClient` and over a
/// child process by `llembed_process::ProcessClient`.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce the embedding for `request.text`.
    async fn embed(&self, request: &EmbeddingRequest) -> Result<EmbeddingResult>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}
