//! `embeddings`: print the embedding of a text computed in-process.

#![deny(unsafe_code)]

use std::process::ExitCode;

fn main() -> ExitCode {
    llembed_cli::app::embeddings_main(std::env::args_os())
}
