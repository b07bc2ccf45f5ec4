//! sparql-paginator CLI
//!
//! Fetches a CONSTRUCT query page by page and appends the result to one file

use clap::Parser;
use sparql_paginator::cli::{Cli, Runner};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging; stdout carries only the run summary
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let runner = Runner::new(cli);

    if let Err(e) = runner.run().await {
        eprintln!("Error: {e}");
        if let Some(offset) = e.resume_offset() {
            eprintln!("Spool files written so far are kept; resume with --initialoffset {offset}");
        }
        std::process::exit(1);
    }
}
