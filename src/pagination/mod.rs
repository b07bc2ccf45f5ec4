//! Pagination module
//!
//! Offset/limit windowing over a SPARQL endpoint.
//!
//! # Overview
//!
//! - `PageFetcher` - Executes one bound query and returns a `Page`
//! - `SparqlFetcher` - `PageFetcher` over the SPARQL protocol client
//! - `PaginationController` - Drives the fetch → spool loop and the merge
//! - `PaginationSession` - Template, window parameters and file layout of a run

mod controller;
mod fetcher;
mod types;

pub use controller::{PaginationController, PaginationSession};
pub use fetcher::{PageFetcher, SparqlFetcher};
pub use types::{ControllerState, Page, PaginationStats, RunSummary};
