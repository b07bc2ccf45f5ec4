//! Query template module
//!
//! Loads a base SPARQL query and binds `LIMIT`/`OFFSET` windows into it.
//!
//! # Overview
//!
//! - `QueryTemplate` - Parsed base query with `limit` and `offset` slots
//! - `load_template` - Read a template from a query file

mod loader;
mod template;

pub use loader::load_template;
pub use template::{QueryForm, QueryTemplate};
