//! # llembed-cli
//!
//! The three llembed programs:
//!
//! - `embeddings`: in-process embedding through [`llembed_engine`]
//! - `embeddings-wrapper`: embedding through the external `embedding`
//!   executable, with `-format text|json`
//! - `embedding-probe`: shows how a model responds to dimension hints
//!
//! The binaries are thin; argument handling and the run flows live here so
//! they can be driven from tests with in-memory input and output.
//!
//! ## Crate Position
//!
//! Depends on: llembed-core, llembed-settings, llembed-engine, llembed-process.

#![deny(unsafe_code)]

pub mod app;
pub mod args;
pub mod cli;
pub mod probe;
pub mod run;
