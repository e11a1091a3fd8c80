//! Error types for extraction runs.
//!
//! [`ExportError`] is returned when a run cannot start or must abort.
//! [`CandidateError`] describes why a single asset was skipped; those never
//! stop the batch and are only counted.

use std::path::PathBuf;
use streamdb_formats::FormatError;
use thiserror::Error;

/// Result type for run-level operations.
pub type ExportResult<T> = std::result::Result<T, ExportError>;

/// Errors that stop an extraction run.
#[derive(Debug, Error)]
pub enum ExportError {
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to open a shard file.
    #[error("Failed to open shard {path}: {source}")]
    ShardOpen {
        /// Path of the shard
        path: PathBuf,
        /// Underlying format error
        #[source]
        source: FormatError,
    },

    /// Invalid JSON in an entry listing, selection list or config file.
    #[error("Invalid JSON in {path}: {source}")]
    InvalidJson {
        /// File that failed to parse
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Destination volume cannot hold the resolved assets.
    #[error(
        "Not enough space on {}: need {required} bytes, {available} available",
        destination.display()
    )]
    InsufficientSpace {
        /// Output root that was checked
        destination: PathBuf,
        /// Sum of decompressed sizes of every resolved asset
        required: u64,
        /// Free bytes reported for the destination volume
        available: u64,
    },
}

/// Why a single candidate was not written.
#[derive(Debug, Error)]
pub enum CandidateError {
    /// Embedded header could not be read from the archive.
    #[error("Failed to read embedded header: {0}")]
    HeaderRead(#[source] FormatError),

    /// Embedded header did not inflate to its declared size.
    #[error("Failed to decompress embedded header to {target} bytes")]
    HeaderDecompress {
        /// Declared decompressed header size
        target: u64,
    },

    /// Embedded header is malformed for its kind.
    #[error("Failed to parse embedded header: {0}")]
    HeaderParse(#[source] FormatError),

    /// No shard holds the candidate's key.
    #[error("Not found in any shard")]
    NotResolved,

    /// Shard read failed.
    #[error("Failed to read payload from shard: {0}")]
    PayloadRead(#[source] FormatError),

    /// Payload did not inflate to its declared size.
    #[error("Failed to decompress payload to {target} bytes")]
    PayloadDecompress {
        /// Declared decompressed payload size
        target: u64,
    },

    /// Image dimensions or size do not fit the DDS header fields.
    #[error("Image field out of range for DDS header: {0}")]
    ContainerField(u64),

    /// Logical name cannot be placed under the output root.
    #[error("Unsafe output path: {0}")]
    UnsafePath(String),

    /// Destination could not be created or written.
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl CandidateError {
    /// Whether the error happened while decoding the embedded header
    pub const fn is_header_error(&self) -> bool {
        matches!(
            self,
            Self::HeaderRead(_) | Self::HeaderDecompress { .. } | Self::HeaderParse(_)
        )
    }
}
