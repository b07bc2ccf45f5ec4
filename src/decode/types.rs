//! Decoder types and traits
//!
//! Defines the core codec abstractions.

use crate::error::Result;
use std::io::Write;

/// Trait for decoding response bodies into records
pub trait RecordDecoder: Send + Sync {
    /// Media type requested from the endpoint
    fn accept(&self) -> &'static str;

    /// Decode the response body into a list of records
    fn decode(&self, body: &str) -> Result<Vec<String>>;
}

/// Trait for writing records in a line-oriented encoding
pub trait RecordEncoder: Send + Sync {
    /// Write all records to the output, one per line
    fn write(&self, records: &[String], out: &mut dyn Write) -> std::io::Result<()>;
}
