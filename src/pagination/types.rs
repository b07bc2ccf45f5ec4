//! Pagination types
//!
//! Pages, controller state, and run statistics.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Records returned for one window
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    /// A non-empty, ordered batch of records
    Records(Vec<String>),
    /// The window lies past the end of the result set
    Empty,
}

impl Page {
    /// Build a page, mapping zero records to `Empty`
    pub fn from_records(records: Vec<String>) -> Self {
        if records.is_empty() {
            Self::Empty
        } else {
            Self::Records(records)
        }
    }

    /// Check if this is the empty marker
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Number of records on the page
    pub fn len(&self) -> usize {
        match self {
            Self::Records(records) => records.len(),
            Self::Empty => 0,
        }
    }

    /// Records on the page
    pub fn records(&self) -> &[String] {
        match self {
            Self::Records(records) => records,
            Self::Empty => &[],
        }
    }
}

/// State of the fetch loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    /// More windows to fetch
    #[default]
    Running,
    /// An empty page was seen; terminal
    Done,
}

/// Statistics from a pagination run
#[derive(Debug, Clone, Default, Serialize)]
pub struct PaginationStats {
    /// Pages fetched and processed, including the terminating empty page
    pub pages_fetched: usize,
    /// Pages written to spool files
    pub pages_spooled: usize,
    /// Records written to spool files
    pub records_spooled: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl PaginationStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fetched page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Add a spooled page
    pub fn add_spooled(&mut self, records: usize) {
        self.pages_spooled += 1;
        self.records_spooled += records;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}

/// Summary of a completed run, printed as one JSON line
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Merged output file
    pub output: PathBuf,
    /// Offset the run started at
    pub initial_offset: u64,
    /// Offset of the terminating empty page
    pub final_offset: u64,
    /// Number of spool files merged
    pub spool_files: usize,
    /// Records appended to the output
    pub records: usize,
    /// Pages fetched, including the terminating empty page
    pub pages_fetched: usize,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration in milliseconds
    pub elapsed_ms: u64,
}
