//! `embedding-probe`: embed one text with several dimension hints and report
//! what the model returned for each.

#![deny(unsafe_code)]

use std::process::ExitCode;

fn main() -> ExitCode {
    llembed_cli::app::probe_main(std::env::args_os())
}
