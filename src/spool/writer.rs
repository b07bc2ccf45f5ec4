//! Spool file writer
//!
//! Writes one page of records to a file named after the offset it was
//! fetched at.

use super::manifest::SpoolEntry;
use crate::decode::{NTriplesEncoder, RecordEncoder};
use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension of spool and output files
pub const SPOOL_EXTENSION: &str = "nt";

/// File name for the page at `offset`
pub fn spool_file_name(prefix: &str, offset: u64) -> String {
    format!("{prefix}{offset}.{SPOOL_EXTENSION}")
}

/// Recover the fetch offset from a spool file name
pub fn offset_from_path(path: impl AsRef<Path>, prefix: &str) -> Option<u64> {
    path.as_ref()
        .file_name()?
        .to_str()?
        .strip_prefix(prefix)?
        .strip_suffix(&format!(".{SPOOL_EXTENSION}"))?
        .parse()
        .ok()
}

/// Writes pages into a spool directory
pub struct SpoolWriter {
    tmp_dir: PathBuf,
    prefix: String,
    overwrite: bool,
    encoder: Box<dyn RecordEncoder>,
}

impl SpoolWriter {
    /// Create a writer for `tmp_dir` using N-Triples encoding
    pub fn new(tmp_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            tmp_dir: tmp_dir.into(),
            prefix: prefix.into(),
            overwrite: false,
            encoder: Box::new(NTriplesEncoder::new()),
        }
    }

    /// Replace existing spool files instead of failing on collision
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Use a different record encoder
    #[must_use]
    pub fn with_encoder(mut self, encoder: Box<dyn RecordEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    /// Spool directory
    pub fn tmp_dir(&self) -> &Path {
        &self.tmp_dir
    }

    /// Path the page at `offset` is written to
    pub fn path_for(&self, offset: u64) -> PathBuf {
        self.tmp_dir.join(spool_file_name(&self.prefix, offset))
    }

    /// Write a page and return its entry once the data is on disk
    pub fn spool(&self, records: &[String], offset: u64) -> Result<SpoolEntry> {
        let path = self.path_for(offset);

        self.write_file(&path, records)
            .map_err(|e| Error::spool_io(offset, &path, e))?;

        debug!(
            "Spooled {} records at offset {} to {}",
            records.len(),
            offset,
            path.display()
        );

        Ok(SpoolEntry {
            offset,
            path,
            records: records.len(),
        })
    }

    fn write_file(&self, path: &Path, records: &[String]) -> std::io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true);
        if self.overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }

        let mut writer = BufWriter::new(options.open(path)?);
        self.encoder.write(records, &mut writer)?;
        writer.flush()?;

        let file: File = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()
    }
}

impl std::fmt::Debug for SpoolWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpoolWriter")
            .field("tmp_dir", &self.tmp_dir)
            .field("prefix", &self.prefix)
            .field("overwrite", &self.overwrite)
            .finish_non_exhaustive()
    }
}
