//! Go-style flag normalization.
//!
//! The programs accept `-m x`, `--m x`, `-m=x` and `--m=x` alike. Before clap
//! sees the argument vector, every known flag is rewritten to its `--name`
//! long form and its value is attached with `=`, so values that begin with a
//! dash (`-p -0.5`) are never mistaken for flags. Flag parsing stops at the
//! first non-flag argument; what follows is passed after `--`.

use std::ffi::OsString;

/// Flags that print usage.
pub const HELP_FLAGS: &[&str] = &["h", "help"];

/// Value flags shared by both embedding programs.
pub const EMBEDDINGS_FLAGS: &[&str] = &["m", "p", "prompt", "t", "ngl"];

/// Value flags of `embeddings-wrapper`.
pub const WRAPPER_FLAGS: &[&str] = &["m", "p", "prompt", "t", "ngl", "format"];

/// Rewrite `args` (program name first) for clap.
///
/// Unknown flags pass through untouched so clap can report them.
pub fn normalize_go_flags<I, T>(args: I, value_flags: &[&str]) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut iter = args.into_iter().map(Into::into);
    let mut out: Vec<OsString> = iter.next().into_iter().collect();

    while let Some(arg) = iter.next() {
        let Some(text) = arg.to_str() else {
            out.push("--".into());
            out.push(arg);
            break;
        };
        if text == "--" {
            out.push(arg);
            break;
        }
        let Some(flag) = strip_dashes(text) else {
            out.push("--".into());
            out.push(arg);
            break;
        };

        let (name, inline) = match flag.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (flag, None),
        };
        if HELP_FLAGS.contains(&name) {
            out.push(format!("--{name}").into());
        } else if value_flags.contains(&name) {
            if let Some(value) = inline {
                out.push(format!("--{name}={value}").into());
            } else if let Some(value) = iter.next() {
                let mut joined = OsString::from(format!("--{name}="));
                joined.push(&value);
                out.push(joined);
            } else {
                out.push(format!("--{name}").into());
            }
        } else {
            out.push(arg);
        }
    }
    out.extend(iter);
    out
}

fn strip_dashes(arg: &str) -> Option<&str> {
    let rest = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-'))?;
    (!rest.is_empty() && !rest.starts_with('-')).then_some(rest)
}
