//! Executable discovery.

use std::path::{Path, PathBuf};

use tracing::debug;

use llembed_core::{EmbedError, Result};

/// First existing path among `explicit` (if any) followed by `candidates`.
///
/// Relative paths resolve against the current working directory.
pub fn locate_binary(explicit: Option<&Path>, candidates: &[PathBuf]) -> Result<PathBuf> {
    let searched: Vec<PathBuf> = explicit
        .map(Path::to_path_buf)
        .into_iter()
        .chain(candidates.iter().cloned())
        .collect();

    if let Some(found) = searched.iter().find(|p| p.exists()) {
        debug!(binary = %found.display(), "embedding binary located");
        return Ok(found.clone());
    }
    Err(EmbedError::BinaryNotFound {
        candidates: searched,
    })
}
