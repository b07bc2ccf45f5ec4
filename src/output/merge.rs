//! Spool file merger
//!
//! Concatenates spool files, in manifest order, onto `{out_dir}/{prefix}.nt`.
//! The output is opened in append mode and never truncated, so separate runs
//! over disjoint offset ranges accumulate into one file.

use crate::error::{Error, Result};
use crate::spool::{Manifest, SPOOL_EXTENSION};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the merged output
pub fn output_file_name(prefix: &str) -> String {
    format!("{prefix}.{SPOOL_EXTENSION}")
}

/// Appends spooled pages to the final output file
#[derive(Debug, Clone)]
pub struct Merger {
    out_dir: PathBuf,
    prefix: String,
}

impl Merger {
    /// Create a merger writing into `out_dir`
    pub fn new(out_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            out_dir: out_dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Path of the merged output
    pub fn output_path(&self) -> PathBuf {
        self.out_dir.join(output_file_name(&self.prefix))
    }

    /// Append every spool file in the manifest to the output
    ///
    /// All spool files are checked before the output is opened, so a missing
    /// file leaves the output untouched.
    pub fn merge(&self, manifest: &Manifest) -> Result<PathBuf> {
        for path in manifest.paths() {
            std::fs::metadata(path).map_err(|e| Error::merge_io(path, e))?;
        }

        let output = self.output_path();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&output)
            .map_err(|e| Error::merge_io(&output, e))?;
        let mut writer = BufWriter::new(file);

        let mut lines = 0;
        for path in manifest.paths() {
            lines += append_lines(path, &output, &mut writer)?;
        }

        writer
            .flush()
            .and_then(|()| writer.get_ref().sync_all())
            .map_err(|e| Error::merge_io(&output, e))?;

        info!(
            "Merged {} spool files ({} lines) into {}",
            manifest.len(),
            lines,
            output.display()
        );
        Ok(output)
    }
}

/// Copy a spool file line by line, terminating an unterminated last line
fn append_lines(path: &Path, output: &Path, writer: &mut BufWriter<File>) -> Result<usize> {
    let file = File::open(path).map_err(|e| Error::merge_io(path, e))?;
    let mut reader = BufReader::new(file);
    let mut line = Vec::new();
    let mut count = 0;

    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .map_err(|e| Error::merge_io(path, e))?;
        if read == 0 {
            break;
        }
        if line.last() != Some(&b'\n') {
            line.push(b'\n');
        }
        writer
            .write_all(&line)
            .map_err(|e| Error::merge_io(output, e))?;
        count += 1;
    }

    Ok(count)
}
