//! CLI module
//!
//! Command-line interface for a single extraction run: fetch every page of a
//! CONSTRUCT query into spool files, then append them to the output file.

mod commands;
mod runner;

pub use commands::Cli;
pub use runner::Runner;
