//! Spool manifest

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// One spooled page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpoolEntry {
    /// Offset the page was fetched at
    pub offset: u64,
    /// Spool file holding the page
    pub path: PathBuf,
    /// Number of records written
    pub records: usize,
}

/// Append-only log of spool files in retrieval order
///
/// Offsets are strictly ascending; `append` refuses anything else, so
/// insertion order and offset order cannot diverge.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    entries: Vec<SpoolEntry>,
}

impl Manifest {
    /// Create an empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry after the current last one
    pub fn append(&mut self, entry: SpoolEntry) -> Result<()> {
        if let Some(last) = self.entries.last() {
            if entry.offset <= last.offset {
                return Err(Error::Other(format!(
                    "manifest offsets must be strictly ascending: {} after {}",
                    entry.offset, last.offset
                )));
            }
        }
        if entry.records == 0 {
            return Err(Error::Other(format!(
                "refusing manifest entry for empty page at offset {}",
                entry.offset
            )));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Entries in retrieval order
    pub fn entries(&self) -> &[SpoolEntry] {
        &self.entries
    }

    /// Iterate over entries in retrieval order
    pub fn iter(&self) -> impl Iterator<Item = &SpoolEntry> {
        self.entries.iter()
    }

    /// Spool file paths in retrieval order
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|e| e.path.as_path())
    }

    /// Number of spooled pages
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was spooled
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Offset of the last spooled page
    pub fn last_offset(&self) -> Option<u64> {
        self.entries.last().map(|e| e.offset)
    }

    /// Total records across all spooled pages
    pub fn total_records(&self) -> usize {
        self.entries.iter().map(|e| e.records).sum()
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a SpoolEntry;
    type IntoIter = std::slice::Iter<'a, SpoolEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
