//! Process entry points shared by the binaries.
//!
//! Each binary: normalize flags, parse, load settings, start logging, run one
//! flow on a current-thread runtime, then map the outcome to an exit code.

use std::ffi::OsString;
use std::future::Future;
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use tracing::{debug, warn};

use llembed_core::logging::init_subscriber;
use llembed_core::{EmbedError, Result};
use llembed_engine::default_engine;
use llembed_process::{ProcessClient, ProcessConfig};
use llembed_settings::{EmbedSettings, load_settings};

use crate::args::{EMBEDDINGS_FLAGS, WRAPPER_FLAGS, normalize_go_flags};
use crate::cli::{EmbeddingsArgs, Invocation, WrapperArgs, usage};
use crate::probe::{ProbeArgs, run_probe, write_report};
use crate::run::{run_embeddings, run_with_client};

/// `embeddings` entry point.
pub fn embeddings_main<I, T>(argv: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args = match parse::<EmbeddingsArgs>(normalize_go_flags(argv, EMBEDDINGS_FLAGS)) {
        Ok(args) => args,
        Err(code) => return code,
    };
    let settings = startup();
    warn_ignored(&args.common.rest);

    let outcome = block_on(async {
        let invocation = Invocation::resolve(&args.common, None, &settings)?;
        let mut stdout = tokio::io::stdout();
        run_embeddings(&invocation, default_engine(), &settings, tokio::io::stdin(), &mut stdout)
            .await
    });
    finish::<EmbeddingsArgs>(outcome)
}

/// `embeddings-wrapper` entry point.
pub fn wrapper_main<I, T>(argv: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args = match parse::<WrapperArgs>(normalize_go_flags(argv, WRAPPER_FLAGS)) {
        Ok(args) => args,
        Err(code) => return code,
    };
    let settings = startup();
    warn_ignored(&args.common.rest);

    let outcome = block_on(async {
        let invocation = Invocation::resolve(&args.common, args.format.as_deref(), &settings)?;
        let client = ProcessClient::new(ProcessConfig::from_settings(&settings.process));
        let mut stdout = tokio::io::stdout();
        run_with_client(&invocation, &client, tokio::io::stdin(), &mut stdout).await
    });
    finish::<WrapperArgs>(outcome)
}

/// `embedding-probe` entry point.
pub fn probe_main<I, T>(argv: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args = match parse::<ProbeArgs>(argv.into_iter().map(Into::into).collect()) {
        Ok(args) => args,
        Err(code) => return code,
    };
    let settings = startup();

    match probe(&args, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn probe(args: &ProbeArgs, settings: &EmbedSettings) -> anyhow::Result<()> {
    let report = block_on(run_probe(default_engine(), args, settings))
        .with_context(|| format!("probe of {} failed", args.model.display()))?;
    let stdout = std::io::stdout();
    write_report(&report, args, &mut stdout.lock()).context("failed to write report")?;
    Ok(())
}

/// Parse `argv`, printing clap's message on failure.
fn parse<P: Parser>(argv: Vec<OsString>) -> std::result::Result<P, ExitCode> {
    P::try_parse_from(argv).map_err(|err| {
        let _ = err.print();
        ExitCode::from(parse_failure_code(&err))
    })
}

/// Help and version exit 0, any other parse failure exits 1.
fn parse_failure_code(err: &clap::Error) -> u8 {
    u8::from(err.use_stderr())
}

/// Load settings and start logging. A broken settings file is reported and
/// replaced by defaults.
fn startup() -> EmbedSettings {
    let loaded = load_settings();
    let settings = loaded.as_ref().cloned().unwrap_or_default();
    init_subscriber(&settings.logging.level, settings.logging.format);
    if let Err(err) = loaded {
        warn!(error = %err, "ignoring settings file, using defaults");
    }
    settings
}

fn warn_ignored(rest: &[String]) {
    if !rest.is_empty() {
        warn!(args = ?rest, "ignoring arguments after the flags");
    }
}

/// Run `fut` on a current-thread runtime.
pub fn block_on<F, T>(fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| EmbedError::Embedding(format!("failed to start async runtime: {e}")))?;
    runtime.block_on(fut)
}

/// Map the outcome to an exit code, printing one diagnostic on failure.
fn finish<P: CommandFactory>(outcome: Result<()>) -> ExitCode {
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!(kind = err.kind(), error = %err, "invocation failed");
            eprintln!("error: {err}");
            if err.is_usage() {
                eprintln!("{}", usage::<P>());
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llembed_core::logging::capture_logs;

    #[test]
    fn help_and_bad_flags_stop_before_running() {
        let argv = normalize_go_flags(["embeddings", "-h"], EMBEDDINGS_FLAGS);
        assert!(parse::<EmbeddingsArgs>(argv).is_err());
        let argv = normalize_go_flags(["embeddings", "-bogus"], EMBEDDINGS_FLAGS);
        assert!(parse::<EmbeddingsArgs>(argv).is_err());
        let argv = normalize_go_flags(["embeddings-wrapper", "-m", "x"], WRAPPER_FLAGS);
        assert!(parse::<WrapperArgs>(argv).is_ok());
    }

    #[test]
    fn parse_failures_exit_one_and_help_exits_zero() {
        let err = ProbeArgs::try_parse_from(["embedding-probe"]).unwrap_err();
        assert_eq!(parse_failure_code(&err), 1);
        let err = ProbeArgs::try_parse_from(["embedding-probe", "--help"]).unwrap_err();
        assert_eq!(parse_failure_code(&err), 0);
        let argv = normalize_go_flags(["embeddings", "-bogus"], EMBEDDINGS_FLAGS);
        let err = EmbeddingsArgs::try_parse_from(argv).unwrap_err();
        assert_eq!(parse_failure_code(&err), 1);
    }

    #[test]
    fn failure_logs_error_kind() {
        let (logs, _guard) = capture_logs();
        let _ = finish::<EmbeddingsArgs>(Err(EmbedError::Usage("model path is required".into())));
        assert_eq!(logs.field("invocation failed", "kind").as_deref(), Some("usage"));
        let _ = finish::<WrapperArgs>(Err(EmbedError::Parse("none".into())));
        assert!(
            logs.events()
                .iter()
                .any(|e| e.fields.iter().any(|(k, v)| k == "kind" && v == "parse"))
        );
    }

    #[test]
    fn block_on_returns_future_result() {
        assert_eq!(block_on(async { Ok(7) }).unwrap(), 7);
        assert!(block_on(async { Err::<(), _>(EmbedError::Usage("x".into())) }).is_err());
    }
}
