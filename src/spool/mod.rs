//! Spool module
//!
//! Persists each fetched page to its own file and keeps the retrieval-ordered
//! manifest that drives the merge.
//!
//! # Overview
//!
//! - `SpoolWriter` - Writes one page to `{tmp_dir}/{prefix}{offset}.nt`
//! - `Manifest` - Append-only, strictly offset-ordered log of spool files
//! - `SpoolEntry` - One spooled page

mod manifest;
mod writer;

pub use manifest::{Manifest, SpoolEntry};
pub use writer::{offset_from_path, spool_file_name, SpoolWriter, SPOOL_EXTENSION};
