//! Response decoding module
//!
//! Turns endpoint response bodies into page records and writes records back
//! out in the same line-oriented encoding.
//!
//! # Formats
//!
//! - **N-Triples**: one statement per line, the format used for spool files
//!   and the merged output

mod ntriples;
mod types;

pub use ntriples::{NTriplesDecoder, NTriplesEncoder, NTRIPLES_MEDIA_TYPE};
pub use types::{RecordDecoder, RecordEncoder};
