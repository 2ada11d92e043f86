//! Input resolution: prompt flag, or drained standard input.

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info};

use crate::errors::{EmbedError, Result};

/// Printed before draining stdin so interactive users know to send EOF.
pub const STDIN_HINT: &str = "Reading from stdin (press Ctrl+D when done)...";

/// Resolve the text to embed.
///
/// A non-empty `prompt` is returned verbatim. Otherwise `reader` is drained
/// to end-of-stream and the whole content is trimmed. Empty results are a
/// [`EmbedError::Usage`]; read failures are [`EmbedError::Input`].
pub async fn resolve_input<R>(prompt: Option<String>, mut reader: R) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    let text = match prompt.filter(|p| !p.is_empty()) {
        Some(prompt) => prompt,
        None => {
            info!("{STDIN_HINT}");
            let mut buf = Vec::new();
            let n = reader
                .read_to_end(&mut buf)
                .await
                .map_err(EmbedError::Input)?;
            debug!(bytes = n, "read input from stdin");
            String::from_utf8_lossy(&buf).trim().to_owned()
        }
    };

    if text.trim().is_empty() {
        return Err(EmbedError::Usage("no input text provided".into()));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::capture_logs;
    use assert_matches::assert_matches;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    struct FailingReader;

    impl AsyncRead for FailingReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "device unplugged",
            )))
        }
    }

    struct UntouchableReader;

    impl AsyncRead for UntouchableReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            panic!("stdin must not be read when a prompt is given");
        }
    }

    #[tokio::test]
    async fn prompt_used_verbatim() {
        let text = resolve_input(Some("  Hello world ".into()), UntouchableReader)
            .await
            .unwrap();
        assert_eq!(text, "  Hello world ");
    }

    #[tokio::test]
    async fn stdin_lines_joined_and_trimmed() {
        let input: &[u8] = b"\n  first line\nsecond line\n\n";
        let text = resolve_input(None, input).await.unwrap();
        assert_eq!(text, "first line\nsecond line");
    }

    #[tokio::test]
    async fn stdin_keeps_final_line_without_newline() {
        let input: &[u8] = b"no trailing newline";
        let text = resolve_input(None, input).await.unwrap();
        assert_eq!(text, "no trailing newline");
    }

    #[tokio::test]
    async fn empty_prompt_falls_back_to_stdin() {
        let input: &[u8] = b"from stdin\n";
        let text = resolve_input(Some(String::new()), input).await.unwrap();
        assert_eq!(text, "from stdin");
    }

    #[tokio::test]
    async fn empty_stdin_is_usage_error() {
        let input: &[u8] = b"   \n\t\n";
        let err = resolve_input(None, input).await.unwrap_err();
        assert_matches!(err, EmbedError::Usage(msg) if msg == "no input text provided");
    }

    #[tokio::test]
    async fn whitespace_prompt_is_usage_error() {
        let err = resolve_input(Some("   ".into()), UntouchableReader)
            .await
            .unwrap_err();
        assert!(err.is_usage());
    }

    #[tokio::test]
    async fn read_error_aborts() {
        let err = resolve_input(None, FailingReader).await.unwrap_err();
        assert_matches!(err, EmbedError::Input(e) if e.to_string() == "device unplugged");
    }

    #[tokio::test]
    async fn stdin_hint_logged() {
        let (logs, _guard) = capture_logs();
        let input: &[u8] = b"abc";
        let _ = resolve_input(None, input).await.unwrap();
        assert!(logs.has_message("press Ctrl+D"));
    }
}
