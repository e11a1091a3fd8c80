//! Per-asset working record
//!
//! One [`Candidate`] exists per filtered archive entry. Stages fill it in
//! order: header decoding sets payload sizes and image metadata, key
//! calculation sets `lookup_key`, location sets `location`.

use crate::error::CandidateError;
use streamdb_formats::{ArchiveEntry, EmbeddedHeader, ImageInfo, ShardKey};

/// Which locator pass produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupPass {
    /// Lookup key matched directly
    Direct,
    /// Key matched with a size mismatch, key + 1 matched in the same shard
    CollisionRetry,
    /// Only key - 1 matched, in the fallback scan
    OffByOne,
}

/// Resolved shard location. Either all of it is known or none of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardLocation {
    /// Index of the shard in the configured shard list
    pub shard_id: usize,
    /// Shard file name
    pub shard_name: String,
    /// Byte offset of the block in the shard
    pub offset: u64,
    /// Key the shard actually matched
    pub matched_key: ShardKey,
    /// Pass that matched
    pub pass: LookupPass,
}

/// One asset moving through the pipeline
#[derive(Debug)]
pub struct Candidate {
    /// Logical path from the archive
    pub name: String,
    /// Content hash, archive byte order
    pub hash: u64,
    /// Embedded header offset in the archive
    pub archive_offset: u64,
    /// Embedded header stored size
    pub archive_compressed_size: u64,
    /// Embedded header inflated size
    pub archive_decompressed_size: u64,
    /// Decoded embedded header, `None` until decoded or when decoding failed
    pub header: Option<EmbeddedHeader>,
    /// Why header decoding failed
    pub header_error: Option<CandidateError>,
    /// Lookup key, set once after the header is decoded
    pub lookup_key: Option<ShardKey>,
    /// Resolved location, `None` when unresolved
    pub location: Option<ShardLocation>,
}

impl Candidate {
    /// Start a candidate from an archive entry
    pub fn from_entry(entry: &ArchiveEntry) -> Self {
        Self {
            name: entry.name.clone(),
            hash: entry.hash,
            archive_offset: entry.data_offset,
            archive_compressed_size: entry.compressed_size,
            archive_decompressed_size: entry.decompressed_size,
            header: None,
            header_error: None,
            lookup_key: None,
            location: None,
        }
    }

    /// Payload size stored in the shard (0 until the header is decoded)
    pub fn compressed_size(&self) -> u64 {
        self.header.map_or(0, |h| h.compressed_size)
    }

    /// Payload size after decompression (0 until the header is decoded)
    pub fn decompressed_size(&self) -> u64 {
        self.header.map_or(0, |h| h.decompressed_size)
    }

    /// Compression type tag for reports
    pub fn compression_type(&self) -> u8 {
        self.header.map_or(0, |h| h.compression_type())
    }

    /// Image metadata, image kind only
    pub fn image(&self) -> Option<ImageInfo> {
        self.header.and_then(|h| h.image)
    }

    /// Whether a shard location is known
    pub const fn is_resolved(&self) -> bool {
        self.location.is_some()
    }

    /// Shard id for reports, `-1` when unresolved
    pub fn shard_id(&self) -> i64 {
        self.location
            .as_ref()
            .map_or(-1, |loc| i64::try_from(loc.shard_id).unwrap_or(i64::MAX))
    }
}
