//! Error types for format operations

use thiserror::Error;

/// Format operation result type
pub type FormatResult<T> = Result<T, FormatError>;

/// Errors raised while reading resource headers and shard indices
#[derive(Debug, Error)]
pub enum FormatError {
    /// Shard file does not start with the streamdb magic
    #[error("Invalid streamdb magic: {0:#018x}")]
    InvalidMagic(u64),

    /// Shard entry table runs past the end of the file
    #[error("Entry table truncated: {entry_count} entries need {needed} bytes, file has {available}")]
    TruncatedEntryTable {
        /// Declared entry count from the header
        entry_count: u32,
        /// Bytes required to hold header and table
        needed: u64,
        /// Actual file length
        available: u64,
    },

    /// Embedded header is shorter than its layout requires
    #[error("Embedded header too short: need {needed} bytes, got {actual}")]
    HeaderTooShort {
        /// Minimum length required by the layout
        needed: usize,
        /// Length of the decoded header
        actual: usize,
    },

    /// Declared header or payload size does not fit in memory on this platform
    #[error("Size out of range: {0}")]
    SizeOutOfRange(u64),

    /// Read returned fewer bytes than requested
    #[error("Short read at offset {offset}: requested {requested} bytes, got {received}")]
    ShortRead {
        /// Offset of the read
        offset: u64,
        /// Number of bytes requested
        requested: u64,
        /// Number of bytes actually read
        received: u64,
    },

    /// Binary read/write error
    #[error("Binary format error: {0}")]
    BinRead(#[from] binrw::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
