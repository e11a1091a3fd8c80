//! Read-only data sources consumed by the pipeline
//!
//! The archive directory parser and the shard container are external; the
//! pipeline only needs entry records, offset reads and key lookups.

use crate::{ExportError, ExportResult};
use std::fs;
use std::path::{Path, PathBuf};
use streamdb_formats::{
    ArchiveEntry, FormatResult, ShardKey, ShardLookup, StreamDbFile, read_range,
};
use tracing::info;

/// Primary archive: entry list plus random-offset reads
pub trait ResourceSource: Sync {
    /// Every entry listed by the archive
    fn entries(&self) -> &[ArchiveEntry];

    /// Read `len` bytes at `offset` of the archive file
    fn read_at(&self, offset: u64, len: u64) -> FormatResult<Vec<u8>>;
}

/// Shard file: key lookups plus random-offset reads
pub trait ShardSource: Sync {
    /// Name used in reports
    fn name(&self) -> &str;

    /// Query for a block by key and stored size
    fn lookup(&self, key: ShardKey, expected_size: u64) -> ShardLookup;

    /// Read `len` raw bytes at `offset`
    fn read_at(&self, offset: u64, len: u64) -> FormatResult<Vec<u8>>;
}

impl ShardSource for StreamDbFile {
    fn name(&self) -> &str {
        Self::name(self)
    }

    fn lookup(&self, key: ShardKey, expected_size: u64) -> ShardLookup {
        Self::lookup(self, key, expected_size)
    }

    fn read_at(&self, offset: u64, len: u64) -> FormatResult<Vec<u8>> {
        Self::read_at(self, offset, len)
    }
}

/// `.resources` archive on disk with an externally parsed entry list
#[derive(Debug, Clone)]
pub struct ResourceFile {
    path: PathBuf,
    entries: Vec<ArchiveEntry>,
}

impl ResourceFile {
    /// Pair an archive path with its entry records
    pub fn new(path: impl AsRef<Path>, entries: Vec<ArchiveEntry>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            entries,
        }
    }

    /// Load the entry records from a JSON listing
    ///
    /// # Errors
    ///
    /// Returns error if the listing cannot be read or is not a JSON array of entries
    pub fn with_listing(path: impl AsRef<Path>, listing: impl AsRef<Path>) -> ExportResult<Self> {
        let listing = listing.as_ref();
        let text = fs::read_to_string(listing)?;
        let entries: Vec<ArchiveEntry> =
            serde_json::from_str(&text).map_err(|source| ExportError::InvalidJson {
                path: listing.to_path_buf(),
                source,
            })?;

        info!(
            "Loaded {} entries for {} from {}",
            entries.len(),
            path.as_ref().display(),
            listing.display()
        );
        Ok(Self::new(path, entries))
    }

    /// Archive file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResourceSource for ResourceFile {
    fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    fn read_at(&self, offset: u64, len: u64) -> FormatResult<Vec<u8>> {
        read_range(&self.path, offset, len)
    }
}

/// Open every shard, keeping the given priority order
///
/// # Errors
///
/// Returns error naming the first shard that cannot be opened or parsed
pub fn open_shards(paths: &[PathBuf]) -> ExportResult<Vec<StreamDbFile>> {
    let shards = paths
        .iter()
        .map(|path| {
            StreamDbFile::open(path).map_err(|source| ExportError::ShardOpen {
                path: path.clone(),
                source,
            })
        })
        .collect::<ExportResult<Vec<_>>>()?;

    info!("Opened {} shard files", shards.len());
    Ok(shards)
}
