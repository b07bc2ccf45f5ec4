//! Pagination controller
//!
//! Drives the bind → fetch → spool loop over consecutive windows until the
//! endpoint returns an empty page, then merges the spooled pages.
//!
//! Up to `concurrency` windows may be in flight at once. Completed pages are
//! parked in an offset-keyed buffer and consumed strictly in offset order, so
//! the manifest and the output never depend on completion order. With a
//! concurrency of one, each window is fully processed before the next one is
//! requested.

use super::fetcher::PageFetcher;
use super::types::{ControllerState, Page, PaginationStats, RunSummary};
use crate::error::{Error, Result};
use crate::output::Merger;
use crate::query::QueryTemplate;
use crate::spool::{Manifest, SpoolWriter};
use crate::types::PageWindow;
use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Everything one extraction run works with
#[derive(Debug, Clone)]
pub struct PaginationSession {
    /// Base query
    pub template: QueryTemplate,
    /// Page size
    pub limit: u64,
    /// Offset of the first window
    pub initial_offset: u64,
    /// Directory for spool files
    pub tmp_dir: PathBuf,
    /// Directory for the merged output
    pub out_dir: PathBuf,
    /// Shared prefix of spool and output files
    pub prefix: String,
    /// Replace spool files left by an earlier run
    pub overwrite_spool: bool,
}

impl PaginationSession {
    /// Create a session with default directories and prefix
    pub fn new(template: QueryTemplate, limit: u64) -> Self {
        Self {
            template,
            limit,
            initial_offset: 0,
            tmp_dir: PathBuf::from("out/tmp"),
            out_dir: PathBuf::from("out"),
            prefix: "p".to_string(),
            overwrite_spool: false,
        }
    }

    /// Set the initial offset
    #[must_use]
    pub fn with_initial_offset(mut self, offset: u64) -> Self {
        self.initial_offset = offset;
        self
    }

    /// Set the spool and output directories
    #[must_use]
    pub fn with_dirs(mut self, tmp_dir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        self.tmp_dir = tmp_dir.into();
        self.out_dir = out_dir.into();
        self
    }

    /// Set the file prefix
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Replace existing spool files
    #[must_use]
    pub fn with_overwrite_spool(mut self, overwrite: bool) -> Self {
        self.overwrite_spool = overwrite;
        self
    }

    /// The first window of the session
    pub fn first_window(&self) -> Result<PageWindow> {
        PageWindow::new(self.limit, self.initial_offset)
    }
}

type Completed = (u64, Result<Page>);

/// Owns a session and runs it to completion
pub struct PaginationController {
    session: PaginationSession,
    fetcher: Arc<dyn PageFetcher>,
    spool: SpoolWriter,
    manifest: Manifest,
    concurrency: usize,
    state: ControllerState,
    /// Offset of the next window to consume
    cursor: u64,
    stats: PaginationStats,
}

impl PaginationController {
    /// Create a controller for a session
    pub fn new(session: PaginationSession, fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        let first = session.first_window()?;
        let spool = SpoolWriter::new(&session.tmp_dir, &session.prefix)
            .with_overwrite(session.overwrite_spool);

        Ok(Self {
            session,
            fetcher,
            spool,
            manifest: Manifest::new(),
            concurrency: 1,
            state: ControllerState::Running,
            cursor: first.offset,
            stats: PaginationStats::new(),
        })
    }

    /// Allow up to `concurrency` windows in flight (minimum one)
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Current state
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Offset of the next window to consume
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Pages spooled so far
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Get statistics
    pub fn stats(&self) -> &PaginationStats {
        &self.stats
    }

    /// Fetch and spool pages until the endpoint returns an empty page
    ///
    /// Any fetch, spool or template failure aborts immediately; spool files
    /// written before the failure stay on disk.
    pub async fn fetch_all(&mut self) -> Result<()> {
        let start = Instant::now();
        let limit = self.session.limit;

        let mut next_window = Some(self.session.first_window()?);
        let mut in_flight = FuturesUnordered::new();
        let mut ready: BTreeMap<u64, Result<Page>> = BTreeMap::new();

        info!(
            "Starting paginated fetch at offset {} with limit {}",
            self.cursor, limit
        );

        while self.state == ControllerState::Running {
            while let Some(result) = ready.remove(&self.cursor) {
                let offset = self.cursor;
                let page = result.map_err(|e| Error::fetch(offset, e))?;
                self.consume(offset, page)?;
                if self.state == ControllerState::Done {
                    break;
                }
            }
            if self.state == ControllerState::Done {
                break;
            }

            while in_flight.len() + ready.len() < self.concurrency {
                let Some(window) = next_window else { break };
                in_flight.push(self.request(window));
                next_window = window.next().ok();
            }

            let Some((offset, result)) = in_flight.next().await else {
                // Nothing left to schedule: the offset space is exhausted
                return Err(Error::fetch(
                    self.cursor,
                    Error::template(format!(
                        "offset overflow advancing past {} by {limit}",
                        self.cursor
                    )),
                ));
            };
            ready.insert(offset, result);
        }

        self.stats.set_duration(start.elapsed().as_millis() as u64);
        info!(
            "Fetch complete: {} pages spooled, {} records, empty page at offset {}",
            self.stats.pages_spooled, self.stats.records_spooled, self.cursor
        );
        Ok(())
    }

    /// Run the whole session: fetch every page, then merge
    pub async fn run(mut self) -> Result<RunSummary> {
        let started_at = Utc::now();
        let start = Instant::now();

        self.fetch_all().await?;

        let merger = Merger::new(&self.session.out_dir, &self.session.prefix);
        let output = merger.merge(&self.manifest)?;

        Ok(RunSummary {
            output,
            initial_offset: self.session.initial_offset,
            final_offset: self.cursor,
            spool_files: self.manifest.len(),
            records: self.manifest.total_records(),
            pages_fetched: self.stats.pages_fetched,
            started_at,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Build the request future for a window
    fn request(&self, window: PageWindow) -> impl std::future::Future<Output = Completed> {
        let query = self.session.template.bind(window);
        let fetcher = Arc::clone(&self.fetcher);
        debug!("Requesting {window}");
        async move { (window.offset, fetcher.fetch(&query).await) }
    }

    /// Apply one page at the cursor: terminate on empty, otherwise spool and advance
    fn consume(&mut self, offset: u64, page: Page) -> Result<()> {
        self.stats.add_page();

        let records = match page {
            Page::Empty => {
                debug!("Empty page at offset {offset}, stopping");
                self.state = ControllerState::Done;
                return Ok(());
            }
            Page::Records(records) => records,
        };

        let entry = self.spool.spool(&records, offset)?;
        info!(
            "Page at offset {}: {} records -> {}",
            offset,
            entry.records,
            entry.path.display()
        );
        self.stats.add_spooled(entry.records);
        self.manifest.append(entry)?;

        self.cursor = PageWindow::new(self.session.limit, offset)?.next()?.offset;
        Ok(())
    }
}

impl std::fmt::Debug for PaginationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationController")
            .field("session", &self.session)
            .field("state", &self.state)
            .field("cursor", &self.cursor)
            .field("concurrency", &self.concurrency)
            .field("spooled", &self.manifest.len())
            .finish_non_exhaustive()
    }
}
