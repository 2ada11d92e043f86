//! Output rendering.

use serde::Serialize;

use crate::errors::Result;
use crate::types::{EmbeddingResult, OutputFormat};

/// Fractional digits used by text output unless a caller overrides it.
pub const DEFAULT_PRECISION: usize = 6;

/// Wire shape of JSON output.
#[derive(Serialize)]
struct JsonOutput<'a> {
    embeddings: &'a [f32],
    dimension: usize,
}

/// Render a result in the requested format with the default precision.
pub fn render(result: &EmbeddingResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(result.values(), DEFAULT_PRECISION)),
        OutputFormat::Json => render_json(result),
    }
}

/// Comma-separated fixed-point decimals, in vector order, no trailing separator.
pub fn render_text(values: &[f32], precision: usize) -> String {
    values
        .iter()
        .map(|v| format!("{v:.precision$}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `{"embeddings": [...], "dimension": N}` with two-space indentation.
///
/// JSON has no NaN or infinity, so a vector holding one is an encoding error
/// rather than a silent `null`.
pub fn render_json(result: &EmbeddingResult) -> Result<String> {
    if let Some((index, value)) = result
        .values()
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_finite())
    {
        return Err(<serde_json::Error as serde::ser::Error>::custom(format!(
            "embedding value {index} is not finite ({value})"
        ))
        .into());
    }
    let out = JsonOutput {
        embeddings: result.values(),
        dimension: result.dimension(),
    };
    Ok(serde_json::to_string_pretty(&out)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EmbedError;
    use assert_matches::assert_matches;

    #[test]
    fn text_six_digits() {
        let result = EmbeddingResult::new(vec![1.0, 2.0, 3.0]);
        assert_eq!(
            render(&result, OutputFormat::Text).unwrap(),
            "1.000000, 2.000000, 3.000000"
        );
    }

    #[test]
    fn text_custom_precision() {
        assert_eq!(render_text(&[0.123_456_7, -1.5], 4), "0.1235, -1.5000");
    }

    #[test]
    fn text_preserves_order_and_values() {
        let values = [3.0, -1.0, 0.0, 2.5];
        assert_eq!(
            render_text(&values, 1),
            "3.0, -1.0, 0.0, 2.5"
        );
    }

    #[test]
    fn text_empty_vector() {
        assert_eq!(render(&EmbeddingResult::new(vec![]), OutputFormat::Text).unwrap(), "");
    }

    #[test]
    fn json_contains_values_and_dimension() {
        let result = EmbeddingResult::new(vec![1.0, 2.0]);
        let rendered = render(&result, OutputFormat::Json).unwrap();
        assert!(rendered.contains("\"dimension\": 2"));

        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["embeddings"], serde_json::json!([1.0, 2.0]));
        assert_eq!(value["dimension"], 2);
    }

    #[test]
    fn json_two_space_indent() {
        let rendered = render_json(&EmbeddingResult::new(vec![0.5])).unwrap();
        assert_eq!(
            rendered,
            "{\n  \"embeddings\": [\n    0.5\n  ],\n  \"dimension\": 1\n}"
        );
    }

    #[test]
    fn json_empty_vector() {
        let rendered = render_json(&EmbeddingResult::new(vec![])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["embeddings"], serde_json::json!([]));
        assert_eq!(value["dimension"], 0);
    }

    #[test]
    fn json_rejects_non_finite_values() {
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let result = EmbeddingResult::new(vec![0.5, bad]);
            let err = render(&result, OutputFormat::Json).unwrap_err();
            assert_matches!(err, EmbedError::Encoding(_));
            assert!(err.to_string().contains("embedding value 1 is not finite"));
        }
    }

    #[test]
    fn text_prints_non_finite_values() {
        assert_eq!(render_text(&[f32::NAN, f32::INFINITY], 2), "NaN, inf");
    }
}
