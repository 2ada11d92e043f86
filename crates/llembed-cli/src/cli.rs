//! Argument definitions.
//!
//! Long names are the single-letter Go flag names (`--m`, `--ngl`); see
//! [`crate::args`] for how `-m value` is brought into that form.

use std::path::PathBuf;

use clap::{ArgAction, Args, CommandFactory, Parser};

use llembed_core::{EmbedError, OutputFormat, Result};
use llembed_settings::EmbedSettings;

/// Flags shared by `embeddings` and `embeddings-wrapper`.
#[derive(Clone, Debug, Default, Args)]
pub struct CommonArgs {
    /// Path to the GGUF model file
    #[arg(long = "m", value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// Text to embed (reads stdin when omitted)
    #[arg(long = "p", visible_alias = "prompt", value_name = "TEXT")]
    pub prompt: Option<String>,

    /// Number of threads
    #[arg(long = "t", value_name = "N")]
    pub threads: Option<usize>,

    /// Number of layers to offload to the GPU
    #[arg(long = "ngl", value_name = "N")]
    pub gpu_layers: Option<u32>,

    /// Print help
    #[arg(long = "help", visible_alias = "h", action = ArgAction::Help)]
    help: Option<bool>,

    /// Arguments after the flags; ignored.
    #[arg(last = true, hide = true)]
    pub rest: Vec<String>,
}

/// `embeddings`: in-process embedding.
#[derive(Debug, Parser)]
#[command(
    name = "embeddings",
    about = "Generate an embedding for text with a GGUF model",
    disable_help_flag = true,
    override_usage = "embeddings -m <model> [-p <text>] [-t <threads>] [-ngl <layers>]"
)]
pub struct EmbeddingsArgs {
    #[command(flatten)]
    /// Shared flags.
    pub common: CommonArgs,
}

/// `embeddings-wrapper`: embedding through the external executable.
#[derive(Debug, Parser)]
#[command(
    name = "embeddings-wrapper",
    about = "Generate an embedding for text by running the llama.cpp embedding binary",
    disable_help_flag = true,
    override_usage = "embeddings-wrapper -m <model> [-p <text>] [-t <threads>] [-ngl <layers>] [-format text|json]"
)]
pub struct WrapperArgs {
    #[command(flatten)]
    /// Shared flags.
    pub common: CommonArgs,

    /// Output format: text or json
    #[arg(long = "format", value_name = "FORMAT")]
    pub format: Option<String>,
}

/// Everything one invocation needs, after flags are merged over settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    /// Model file.
    pub model: PathBuf,
    /// Prompt flag, if given and non-empty.
    pub prompt: Option<String>,
    /// Thread count; 0 leaves it to the engine.
    pub threads: usize,
    /// GPU layers.
    pub gpu_layers: u32,
    /// Output format.
    pub format: OutputFormat,
    /// Text precision.
    pub precision: usize,
}

impl Invocation {
    /// Merge `args` over `settings`. Fails when no model path is known.
    pub fn resolve(
        args: &CommonArgs,
        format: Option<&str>,
        settings: &EmbedSettings,
    ) -> Result<Self> {
        let model = args
            .model
            .clone()
            .or_else(|| settings.model.path.as_ref().map(PathBuf::from))
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| EmbedError::Usage("model path is required".into()))?;
        let format = match format {
            Some(raw) => raw.parse()?,
            None => settings.output.format,
        };
        Ok(Self {
            model,
            prompt: args.prompt.clone().filter(|p| !p.is_empty()),
            threads: args.threads.unwrap_or(settings.inference.threads),
            gpu_layers: args.gpu_layers.unwrap_or(settings.model.gpu_layers),
            format,
            precision: settings.output.precision,
        })
    }
}

/// Usage line for `P`, printed after usage errors.
pub fn usage<P: CommandFactory>() -> String {
    P::command().render_usage().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{EMBEDDINGS_FLAGS, WRAPPER_FLAGS, normalize_go_flags};
    use assert_matches::assert_matches;

    fn parse_embeddings(args: &[&str]) -> EmbeddingsArgs {
        EmbeddingsArgs::try_parse_from(normalize_go_flags(args.iter().copied(), EMBEDDINGS_FLAGS))
            .unwrap()
    }

    fn parse_wrapper(args: &[&str]) -> WrapperArgs {
        WrapperArgs::try_parse_from(normalize_go_flags(args.iter().copied(), WRAPPER_FLAGS))
            .unwrap()
    }

    #[test]
    fn parses_go_style_flags() {
        let a = parse_embeddings(&["embeddings", "-m", "m.gguf", "-p", "hi", "-t", "4", "-ngl", "2"]);
        assert_eq!(a.common.model, Some(PathBuf::from("m.gguf")));
        assert_eq!(a.common.prompt.as_deref(), Some("hi"));
        assert_eq!(a.common.threads, Some(4));
        assert_eq!(a.common.gpu_layers, Some(2));
    }

    #[test]
    fn prompt_alias() {
        let a = parse_embeddings(&["embeddings", "--prompt=hello there"]);
        assert_eq!(a.common.prompt.as_deref(), Some("hello there"));
    }

    #[test]
    fn extra_positionals_ignored() {
        let a = parse_embeddings(&["embeddings", "-m", "x", "stray", "-p", "late"]);
        assert_eq!(a.common.prompt, None);
        assert_eq!(a.common.rest, vec!["stray", "-p", "late"]);
    }

    #[test]
    fn wrapper_format_flag() {
        let a = parse_wrapper(&["embeddings-wrapper", "-m", "x", "-format", "json"]);
        assert_eq!(a.format.as_deref(), Some("json"));
    }

    #[test]
    fn help_is_a_display_error() {
        for flag in ["-h", "-help", "--help"] {
            let err = EmbeddingsArgs::try_parse_from(normalize_go_flags(
                ["embeddings", flag],
                EMBEDDINGS_FLAGS,
            ))
            .unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
            assert!(!err.use_stderr());
        }
    }

    #[test]
    fn bad_thread_count_rejected() {
        let result = EmbeddingsArgs::try_parse_from(normalize_go_flags(
            ["embeddings", "-t", "many"],
            EMBEDDINGS_FLAGS,
        ));
        assert!(result.is_err());
    }

    #[test]
    fn resolve_requires_model() {
        let args = CommonArgs::default();
        let err = Invocation::resolve(&args, None, &EmbedSettings::default()).unwrap_err();
        assert_matches!(err, EmbedError::Usage(ref m) if m == "model path is required");
    }

    #[test]
    fn resolve_falls_back_to_settings() {
        let mut settings = EmbedSettings::default();
        settings.model.path = Some("/models/default.gguf".into());
        settings.model.gpu_layers = 12;
        settings.inference.threads = 3;
        settings.output.format = OutputFormat::Json;
        let inv = Invocation::resolve(&CommonArgs::default(), None, &settings).unwrap();
        assert_eq!(inv.model, PathBuf::from("/models/default.gguf"));
        assert_eq!(inv.threads, 3);
        assert_eq!(inv.gpu_layers, 12);
        assert_eq!(inv.format, OutputFormat::Json);
        assert_eq!(inv.precision, 6);
    }

    #[test]
    fn resolve_flags_win() {
        let a = parse_wrapper(&["w", "-m", "m.gguf", "-t", "0", "-ngl", "1", "-p", "", "-format", "TEXT"]);
        let mut settings = EmbedSettings::default();
        settings.output.format = OutputFormat::Json;
        let inv = Invocation::resolve(&a.common, a.format.as_deref(), &settings).unwrap();
        assert_eq!(inv.model, PathBuf::from("m.gguf"));
        assert_eq!(inv.threads, 0);
        assert_eq!(inv.gpu_layers, 1);
        assert_eq!(inv.prompt, None);
        assert_eq!(inv.format, OutputFormat::Text);
    }

    #[test]
    fn resolve_rejects_unknown_format() {
        let args = CommonArgs {
            model: Some("m.gguf".into()),
            ..CommonArgs::default()
        };
        let err = Invocation::resolve(&args, Some("yaml"), &EmbedSettings::default()).unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn usage_names_go_flags() {
        assert!(usage::<EmbeddingsArgs>().contains("-m <model>"));
        assert!(usage::<WrapperArgs>().contains("-format"));
    }
}
