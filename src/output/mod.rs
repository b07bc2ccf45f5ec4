//! Output module
//!
//! Merges spooled pages into the final, cumulative N-Triples file.

mod merge;

pub use merge::{output_file_name, Merger};
