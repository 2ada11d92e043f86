//! # llembed-process
//!
//! Embedding through the external llama.cpp `embedding` executable.
//!
//! - [`locate_binary`] picks the executable from an ordered candidate list
//! - [`ProcessRunner`] runs it and captures both output streams
//! - [`extract_embedding`] scrapes the `embedding 0:` console line
//! - [`decode_json_record`] reads the structured `--embd-output-format json` record
//! - [`ProcessClient`] ties these together as an [`llembed_core::EmbeddingClient`]
//!
//! ## Crate Position
//!
//! Depends on: llembed-core, llembed-settings.
//! Depended on by: llembed-cli.

#![deny(unsafe_code)]

pub mod client;
pub mod extract;
pub mod locate;
pub mod runner;

pub use client::{ProcessClient, ProcessConfig, build_args};
pub use extract::{EMBEDDING_MARKER, decode_json_record, extract_embedding};
pub use locate::locate_binary;
pub use runner::{ProcessOutput, ProcessRunner, TokioProcessRunner};
