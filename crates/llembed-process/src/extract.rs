//! Recovering the embedding vector from the executable's output.

use serde::Deserialize;
use tracing::debug;

use llembed_core::errors::NO_EMBEDDINGS_FOUND;
use llembed_core::{EmbedError, Result};

/// Line prefix of the first prompt's embedding in console output.
pub const EMBEDDING_MARKER: &str = "embedding 0:";

/// Scrape the vector from the first `embedding 0:` line that yields values.
///
/// The marker must start the raw line. Tokens that do not parse as `f32`,
/// or that overflow it, are skipped without error.
pub fn extract_embedding(output: &str) -> Result<Vec<f32>> {
    output
        .lines()
        .filter_map(|line| line.strip_prefix(EMBEDDING_MARKER))
        .map(parse_values)
        .find(|values| !values.is_empty())
        .ok_or_else(|| EmbedError::Parse(NO_EMBEDDINGS_FOUND.into()))
}

fn parse_values(rest: &str) -> Vec<f32> {
    rest.split_whitespace().filter_map(parse_component).collect()
}

fn parse_component(token: &str) -> Option<f32> {
    let value: f32 = token.parse().ok()?;
    // "1e39" parses to inf; only an explicit infinity literal may produce one.
    if value.is_infinite() && !token.to_ascii_lowercase().contains("inf") {
        return None;
    }
    Some(value)
}

#[derive(Deserialize)]
struct ListRecord {
    data: Vec<EmbeddingEntry>,
}

#[derive(Deserialize)]
struct EmbeddingEntry {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// Decode the OpenAI-style list record printed under
/// `--embd-output-format json`.
///
/// Returns `None` when the output holds no such record, so callers can fall
/// back to [`extract_embedding`].
pub fn decode_json_record(output: &str) -> Option<Vec<f32>> {
    let start = output.find('{')?;
    let mut stream = serde_json::Deserializer::from_str(&output[start..]).into_iter::<ListRecord>();
    let record = match stream.next()? {
        Ok(record) => record,
        Err(err) => {
            debug!(error = %err, "stdout does not hold a JSON embedding record");
            return None;
        }
    };
    let mut entries = record.data;
    let pos = entries.iter().position(|e| e.index == 0).unwrap_or(0);
    if pos >= entries.len() {
        return None;
    }
    let values = entries.swap_remove(pos).embedding;
    (!values.is_empty()).then_some(values)
}
