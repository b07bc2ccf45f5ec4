// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # sparql-paginator
//!
//! Exhaustive retrieval of large SPARQL CONSTRUCT results from endpoints that
//! cap the number of results per request.
//!
//! The base query is executed repeatedly with a sliding `LIMIT`/`OFFSET`
//! window. Each non-empty page is spooled to its own N-Triples file; the first
//! empty page ends the run, and the spooled pages are appended in offset order
//! to a single cumulative output file.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sparql_paginator::http::{SparqlClient, SparqlClientConfig};
//! use sparql_paginator::pagination::{PaginationController, PaginationSession, SparqlFetcher};
//! use sparql_paginator::query::load_template;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> sparql_paginator::Result<()> {
//!     let template = load_template("people.rq")?;
//!     let endpoint = "https://dbpedia.org/sparql".parse()?;
//!     let client = SparqlClient::with_config(SparqlClientConfig::new(endpoint))?;
//!
//!     let session = PaginationSession::new(template, 10_000).with_dirs("out/tmp", "out");
//!     let controller = PaginationController::new(session, Arc::new(SparqlFetcher::new(client)))?;
//!     let summary = controller.run().await?;
//!
//!     println!("{} records in {}", summary.records, summary.output.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//!  QueryTemplate ──bind(window)──▶ PageFetcher ──Page──▶ SpoolWriter
//!        ▲                          (SparqlClient,          │
//!        │                           N-Triples decode)      ▼
//!  PaginationController ◀──────── advance / stop ──── Manifest
//!        │
//!        └── on first empty page ──▶ Merger ──▶ {outdir}/{prefix}.nt
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Base query parsing and window binding
pub mod query;

/// SPARQL protocol client with retry and rate limiting
pub mod http;

/// Response decoders (N-Triples)
pub mod decode;

/// Per-page spool files and the manifest
pub mod spool;

/// Offset/limit pagination loop
pub mod pagination;

/// Merged output file
pub mod output;

/// Run configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::PaginatorConfig;
pub use pagination::{PaginationController, PaginationSession, RunSummary};
pub use query::{load_template, QueryTemplate};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
