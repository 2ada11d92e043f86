//! The two embedding flows, generic over input, output and client.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::info;

use llembed_core::{
    EmbedError, EmbeddingClient, EmbeddingRequest, EmbeddingResult, OutputFormat, Result,
    render_json, render_text, resolve_input,
};
use llembed_engine::{EmbeddingEngine, InProcessClient, LoadOptions};
use llembed_settings::EmbedSettings;

use crate::cli::Invocation;

/// Header printed before text output.
pub const TEXT_HEADER: &str = "Embeddings:";

/// In-process flow: load the model, resolve input, embed, print.
///
/// The model loads before stdin is read, so a bad model path fails without
/// waiting for input.
pub async fn run_embeddings<R, W>(
    invocation: &Invocation,
    engine: Arc<dyn EmbeddingEngine>,
    settings: &EmbedSettings,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let options =
        LoadOptions::from_settings(&settings.model).with_gpu_layers(invocation.gpu_layers);
    let client = InProcessClient::load(engine, invocation.model.clone(), options)
        .await?
        .with_dimension_hint(settings.inference.dimension_hint);
    run_with_client(invocation, &client, input, out).await
}

/// Resolve input, embed through `client`, print.
pub async fn run_with_client<C, R, W>(
    invocation: &Invocation,
    client: &C,
    input: R,
    out: &mut W,
) -> Result<()>
where
    C: EmbeddingClient + ?Sized,
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let text = resolve_input(invocation.prompt.clone(), input).await?;
    info!(
        client = client.name(),
        chars = text.chars().count(),
        "Generating embeddings for: {text}"
    );

    let request = EmbeddingRequest::new(invocation.model.clone(), text)
        .with_threads(invocation.threads)
        .with_gpu_layers(invocation.gpu_layers);
    let result = client.embed(&request).await?;
    write_result(&result, invocation.format, invocation.precision, out).await
}

/// Write `result` to `out`: header plus values for text, the document alone for JSON.
pub async fn write_result<W>(
    result: &EmbeddingResult,
    format: OutputFormat,
    precision: usize,
    out: &mut W,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let rendered = match format {
        OutputFormat::Text => {
            format!("{TEXT_HEADER}\n{}\n", render_text(result.values(), precision))
        }
        OutputFormat::Json => format!("{}\n", render_json(result)?),
    };
    out.write_all(rendered.as_bytes())
        .await
        .map_err(EmbedError::Output)?;
    out.flush().await.map_err(EmbedError::Output)
}
