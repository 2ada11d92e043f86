//! Dimension-hint probe.
//!
//! Embeds one text without a hint and once per hint, so the effect of the
//! hint on a given model can be read off directly.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use llembed_core::{EmbeddingRequest, Result, cosine_similarity, render_text};
use llembed_engine::{EmbeddingEngine, InProcessClient, LoadOptions};
use llembed_settings::EmbedSettings;

/// `embedding-probe` arguments.
#[derive(Debug, Parser)]
#[command(
    name = "embedding-probe",
    about = "Show how a GGUF model responds to output dimension hints"
)]
pub struct ProbeArgs {
    /// GGUF model file
    pub model: PathBuf,

    /// Text to embed
    #[arg(default_value = "hello world")]
    pub text: String,

    /// Dimension hints tried after the unhinted run
    #[arg(long = "hint", value_name = "N", default_values_t = [768usize, 128])]
    pub hints: Vec<usize>,

    /// Leading values printed per run
    #[arg(long, default_value_t = 5)]
    pub show: usize,

    /// Fractional digits
    #[arg(long, default_value_t = 6)]
    pub precision: usize,

    /// Threads (0 = engine default) [default: settings `inference.threads`]
    #[arg(long = "threads", short = 't')]
    pub threads: Option<usize>,

    /// GPU layers [default: settings `model.gpuLayers`]
    #[arg(long = "ngl")]
    pub gpu_layers: Option<u32>,
}

/// One embed call of the probe.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbeRun {
    /// Hint passed, if any.
    pub hint: Option<usize>,
    /// Returned vector.
    pub values: Vec<f32>,
}

/// Everything the probe observed.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbeReport {
    /// Model file.
    pub model: PathBuf,
    /// Width the engine reports for the loaded model.
    pub native_dimension: Option<usize>,
    /// Unhinted run first, then one per hint.
    pub runs: Vec<ProbeRun>,
}

impl ProbeReport {
    /// Length of the unhinted vector.
    pub fn auto_dimension(&self) -> Option<usize> {
        self.runs
            .iter()
            .find(|r| r.hint.is_none())
            .map(|r| r.values.len())
    }

    /// Whether the unhinted and `hint` runs returned vectors of equal length.
    pub fn lengths_agree(&self, hint: usize) -> Option<bool> {
        let auto = self.auto_dimension()?;
        self.runs
            .iter()
            .find(|r| r.hint == Some(hint))
            .map(|r| r.values.len() == auto)
    }

    /// Cosine similarity of the unhinted and `hint` vectors over their shared prefix.
    pub fn prefix_similarity(&self, hint: usize) -> Option<f32> {
        let auto = self.runs.iter().find(|r| r.hint.is_none())?;
        self.runs
            .iter()
            .find(|r| r.hint == Some(hint))
            .map(|r| cosine_similarity(&auto.values, &r.values))
    }
}

/// Load the model once and embed `args.text` with each hint.
///
/// Model options come from `settings`; `-t` and `--ngl` override them.
pub async fn run_probe(
    engine: Arc<dyn EmbeddingEngine>,
    args: &ProbeArgs,
    settings: &EmbedSettings,
) -> Result<ProbeReport> {
    let gpu_layers = args.gpu_layers.unwrap_or(settings.model.gpu_layers);
    let threads = args.threads.unwrap_or(settings.inference.threads);
    let options = LoadOptions::from_settings(&settings.model).with_gpu_layers(gpu_layers);
    let client = InProcessClient::load(engine, args.model.clone(), options).await?;
    let request = EmbeddingRequest::new(args.model.clone(), args.text.clone())
        .with_threads(threads)
        .with_gpu_layers(gpu_layers);

    let mut runs = Vec::with_capacity(args.hints.len() + 1);
    for hint in std::iter::once(None).chain(args.hints.iter().copied().map(Some)) {
        let result = client.embed_with_hint(&request, hint).await?;
        runs.push(ProbeRun {
            hint,
            values: result.into_values(),
        });
    }

    let native_dimension = client.native_dimension();
    client.release();
    Ok(ProbeReport {
        model: args.model.clone(),
        native_dimension,
        runs,
    })
}

/// Print `report` in the probe's line format.
pub fn write_report<W: Write>(
    report: &ProbeReport,
    args: &ProbeArgs,
    out: &mut W,
) -> std::io::Result<()> {
    writeln!(out, "Model: {}", report.model.display())?;
    writeln!(out, "Text: {:?}", args.text)?;
    for run in &report.runs {
        let label = run
            .hint
            .map_or_else(|| "no hint".to_string(), |h| format!("hint {h}"));
        let shown = &run.values[..args.show.min(run.values.len())];
        writeln!(
            out,
            "{label}: {} dimensions, first {}: [{}]",
            run.values.len(),
            shown.len(),
            render_text(shown, args.precision)
        )?;
    }
    match report.auto_dimension() {
        Some(auto) => writeln!(out, "Auto-detected dimension: {auto}")?,
        None => writeln!(out, "Auto-detected dimension: unknown")?,
    }
    if let Some(native) = report.native_dimension {
        writeln!(out, "Model native dimension: {native}")?;
    }
    for hint in &args.hints {
        if let Some(agree) = report.lengths_agree(*hint) {
            let verdict = if agree { "yes" } else { "no" };
            writeln!(out, "Unhinted and hint {hint} lengths agree: {verdict}")?;
        }
        if let Some(similarity) = report.prefix_similarity(*hint) {
            writeln!(
                out,
                "Unhinted and hint {hint} prefix cosine: {similarity:.precision$}",
                precision = args.precision
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use llembed_core::EmbedError;
    use llembed_engine::{MockEngine, UnavailableEngine};

    fn gguf(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("model.gguf");
        std::fs::write(&path, b"GGUF\x03\x00\x00\x00").unwrap();
        path
    }

    fn args(model: PathBuf, extra: &[&str]) -> ProbeArgs {
        let model = model.display().to_string();
        let mut argv = vec!["embedding-probe", model.as_str()];
        argv.extend_from_slice(extra);
        ProbeArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults() {
        let a = args(PathBuf::from("m.gguf"), &[]);
        assert_eq!(a.text, "hello world");
        assert_eq!(a.hints, vec![768, 128]);
        assert_eq!(a.show, 5);
        assert_eq!(a.precision, 6);
        assert_eq!(a.threads, None);
        assert_eq!(a.gpu_layers, None);
    }

    #[test]
    fn custom_hints() {
        let a = args(PathBuf::from("m.gguf"), &["some text", "--hint", "64", "--hint", "32"]);
        assert_eq!(a.text, "some text");
        assert_eq!(a.hints, vec![64, 32]);
    }

    #[tokio::test]
    async fn probe_runs_unhinted_then_each_hint() {
        let dir = tempfile::tempdir().unwrap();
        let a = args(gguf(&dir), &[]);
        let engine = Arc::new(MockEngine::new(384));
        let report = run_probe(engine, &a, &EmbedSettings::default()).await.unwrap();
        let lengths: Vec<_> = report.runs.iter().map(|r| (r.hint, r.values.len())).collect();
        assert_eq!(lengths, vec![(None, 384), (Some(768), 768), (Some(128), 128)]);
        assert_eq!(report.auto_dimension(), Some(384));
        assert_eq!(report.native_dimension, Some(384));
        assert_eq!(report.lengths_agree(768), Some(false));
        assert_eq!(report.lengths_agree(1), None);
        let similarity = report.prefix_similarity(128).unwrap();
        assert!((similarity - 1.0).abs() < 1e-5);
        assert_eq!(report.prefix_similarity(1), None);
    }

    #[tokio::test]
    async fn probe_uses_model_settings() {
        let dir = tempfile::tempdir().unwrap();
        let a = args(gguf(&dir), &[]);
        let mut settings = EmbedSettings::default();
        settings.model.context_size = 0;
        let err = run_probe(Arc::new(MockEngine::new(8)), &a, &settings)
            .await
            .unwrap_err();
        assert_matches!(err, EmbedError::ModelLoad { ref message, .. } if message.contains("context size"));
    }

    #[tokio::test]
    async fn probe_load_failure_propagates() {
        let a = args(PathBuf::from("m.gguf"), &[]);
        let settings = EmbedSettings::default();
        assert!(run_probe(Arc::new(UnavailableEngine), &a, &settings).await.is_err());
    }

    #[test]
    fn report_format() {
        let a = args(PathBuf::from("m.gguf"), &["--hint", "2", "--show", "2", "--precision", "4"]);
        let report = ProbeReport {
            model: PathBuf::from("m.gguf"),
            native_dimension: Some(3),
            runs: vec![
                ProbeRun {
                    hint: None,
                    values: vec![0.5, 0.25, 0.125],
                },
                ProbeRun {
                    hint: Some(2),
                    values: vec![0.5, 0.25],
                },
            ],
        };
        let mut out = Vec::new();
        write_report(&report, &a, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Model: m.gguf\n\
             Text: \"hello world\"\n\
             no hint: 3 dimensions, first 2: [0.5000, 0.2500]\n\
             hint 2: 2 dimensions, first 2: [0.5000, 0.2500]\n\
             Auto-detected dimension: 3\n\
             Model native dimension: 3\n\
             Unhinted and hint 2 lengths agree: no\n\
             Unhinted and hint 2 prefix cosine: 1.0000\n"
        );
    }
}
