//! Debug reports of resolved and unresolved candidates
//!
//! Rows go to a [`ReportSink`] passed into the run. [`CsvReport`] writes the
//! two CSV files `matched.csv` and `unmatched.csv`:
//!
//! ```text
//! "name",lookup_key,offset,compressed,decompressed,compression_type,shard_id,"shard"
//! "name",lookup_key,offset,compressed,decompressed,compression_type,-1
//! ```

use crate::ExportResult;
use crate::candidate::Candidate;
use crate::export_list::ExportList;
use parking_lot::Mutex;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// File name of resolved rows
pub const MATCHED_FILE: &str = "matched.csv";

/// File name of unresolved rows
pub const UNMATCHED_FILE: &str = "unmatched.csv";

/// One report line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    /// Logical name
    pub name: String,
    /// Computed lookup key (0 when the header failed to decode)
    pub lookup_key: u64,
    /// Shard byte offset (0 when unresolved)
    pub offset: u64,
    /// Payload stored size
    pub compressed_size: u64,
    /// Payload inflated size
    pub decompressed_size: u64,
    /// Compression type tag
    pub compression_type: u8,
    /// Shard id, -1 when unresolved
    pub shard_id: i64,
    /// Shard file name, resolved rows only
    pub shard_name: Option<String>,
}

impl ReportRow {
    /// Snapshot a candidate
    pub fn from_candidate(candidate: &Candidate) -> Self {
        let location = candidate.location.as_ref();
        Self {
            name: candidate.name.clone(),
            lookup_key: candidate.lookup_key.map_or(0, |key| key.get()),
            offset: location.map_or(0, |loc| loc.offset),
            compressed_size: candidate.compressed_size(),
            decompressed_size: candidate.decompressed_size(),
            compression_type: candidate.compression_type(),
            shard_id: candidate.shard_id(),
            shard_name: location.map(|loc| loc.shard_name.clone()),
        }
    }

    /// CSV line without the trailing newline
    pub fn to_csv(&self) -> String {
        let mut line = format!(
            "{},{},{},{},{},{},{}",
            quote(&self.name),
            self.lookup_key,
            self.offset,
            self.compressed_size,
            self.decompressed_size,
            self.compression_type,
            self.shard_id
        );
        if let Some(shard_name) = &self.shard_name {
            line.push(',');
            line.push_str(&quote(shard_name));
        }
        line
    }
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Destination of report rows
pub trait ReportSink: Send + Sync {
    /// Record a resolved candidate
    fn matched(&self, row: &ReportRow) -> ExportResult<()>;

    /// Record an unresolved candidate
    fn unmatched(&self, row: &ReportRow) -> ExportResult<()>;

    /// Flush buffered rows
    fn finish(&self) -> ExportResult<()> {
        Ok(())
    }
}

/// Write every row of `list`: resolved rows first, then unresolved ones
pub fn write_reports<R: ReportSink + ?Sized>(list: &ExportList, sink: &R) -> ExportResult<()> {
    for candidate in list.resolved() {
        sink.matched(&ReportRow::from_candidate(candidate))?;
    }
    for candidate in list.unresolved() {
        sink.unmatched(&ReportRow::from_candidate(candidate))?;
    }
    Ok(())
}

/// Sink that drops every row
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReport;

impl ReportSink for NullReport {
    fn matched(&self, _row: &ReportRow) -> ExportResult<()> {
        Ok(())
    }

    fn unmatched(&self, _row: &ReportRow) -> ExportResult<()> {
        Ok(())
    }
}

/// Sink that keeps rows in memory
#[derive(Debug, Default)]
pub struct MemoryReport {
    matched: Mutex<Vec<ReportRow>>,
    unmatched: Mutex<Vec<ReportRow>>,
}

impl MemoryReport {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolved rows recorded so far
    pub fn matched_rows(&self) -> Vec<ReportRow> {
        self.matched.lock().clone()
    }

    /// Unresolved rows recorded so far
    pub fn unmatched_rows(&self) -> Vec<ReportRow> {
        self.unmatched.lock().clone()
    }
}

impl ReportSink for MemoryReport {
    fn matched(&self, row: &ReportRow) -> ExportResult<()> {
        self.matched.lock().push(row.clone());
        Ok(())
    }

    fn unmatched(&self, row: &ReportRow) -> ExportResult<()> {
        self.unmatched.lock().push(row.clone());
        Ok(())
    }
}

/// `matched.csv` / `unmatched.csv` writer.
///
/// Both files are truncated when the report is created, so a repeated run
/// leaves the same reports behind.
#[derive(Debug)]
pub struct CsvReport {
    matched: Mutex<BufWriter<File>>,
    unmatched: Mutex<BufWriter<File>>,
}

impl CsvReport {
    /// Create both report files in `dir`
    ///
    /// # Errors
    ///
    /// Returns error if the directory or files cannot be created
    pub fn create(dir: impl AsRef<Path>) -> ExportResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        Ok(Self {
            matched: Mutex::new(BufWriter::new(File::create(dir.join(MATCHED_FILE))?)),
            unmatched: Mutex::new(BufWriter::new(File::create(dir.join(UNMATCHED_FILE))?)),
        })
    }
}

impl ReportSink for CsvReport {
    fn matched(&self, row: &ReportRow) -> ExportResult<()> {
        writeln!(self.matched.lock(), "{}", row.to_csv())?;
        Ok(())
    }

    fn unmatched(&self, row: &ReportRow) -> ExportResult<()> {
        writeln!(self.unmatched.lock(), "{}", row.to_csv())?;
        Ok(())
    }

    fn finish(&self) -> ExportResult<()> {
        self.matched.lock().flush()?;
        self.unmatched.lock().flush()?;
        Ok(())
    }
}
