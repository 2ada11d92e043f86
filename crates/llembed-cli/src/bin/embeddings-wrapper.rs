//! `embeddings-wrapper`: print the embedding of a text computed by the
//! llama.cpp `embedding` executable.

#![deny(unsafe_code)]

use std::process::ExitCode;

fn main() -> ExitCode {
    llembed_cli::app::wrapper_main(std::env::args_os())
}
