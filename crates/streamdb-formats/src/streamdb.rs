//! StreamDB shard files
//!
//! A `.streamdb` file starts with a fixed header and an entry table; the
//! payload blocks follow. Entries address their block in 16-byte units.
//!
//! Layout (little-endian):
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0x00   | 8    | Magic `0x61C7F32E29C2A550` |
//! | 0x08   | 4    | Data start offset |
//! | 0x0C   | 12   | Padding |
//! | 0x18   | 4    | Entry count |
//! | 0x1C   | 4    | Flags |
//! | 0x20   | 16×n | Entries: key (u64), offset / 16 (u32), length (u32) |

use crate::error::{FormatError, FormatResult};
use crate::key::ShardKey;
use crate::read::read_range;
use binrw::{BinRead, BinWrite};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Magic value at the start of every streamdb file
pub const STREAMDB_MAGIC: u64 = 0x61C7_F32E_29C2_A550;

/// Size of [`StreamDbHeader`] on disk
pub const HEADER_SIZE: u64 = 0x20;

/// Size of one [`StreamDbEntry`] on disk
pub const ENTRY_SIZE: u64 = 0x10;

/// StreamDB file header (32 bytes)
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct StreamDbHeader {
    /// Magic value, see [`STREAMDB_MAGIC`]
    pub magic: u64,
    /// Offset of the first payload block
    pub data_start: u32,
    /// Unused
    pub padding: [u32; 3],
    /// Number of entries in the table
    pub entry_count: u32,
    /// Format flags
    pub flags: u32,
}

impl StreamDbHeader {
    /// Header for a table of `entry_count` entries, payload directly after it
    pub fn new(entry_count: u32) -> Self {
        Self {
            magic: STREAMDB_MAGIC,
            data_start: (HEADER_SIZE + u64::from(entry_count) * ENTRY_SIZE) as u32,
            padding: [0; 3],
            entry_count,
            flags: 0,
        }
    }
}

/// One entry in the streamdb table (16 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct StreamDbEntry {
    /// Shard key the block is addressed by
    pub key: u64,
    /// Block offset divided by 16
    pub offset_div16: u32,
    /// Stored block length
    pub length: u32,
}

impl StreamDbEntry {
    /// Absolute byte offset of the block
    pub const fn byte_offset(&self) -> u64 {
        self.offset_div16 as u64 * 16
    }
}

/// Result of querying a shard for a key and expected size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShardLookup {
    /// Key present with the expected size, block at this byte offset
    Found(u64),
    /// Key present, but no block under it has the expected size
    SizeMismatch,
    /// Key absent
    NotFound,
}

/// Parsed streamdb shard index. Payload bytes stay on disk.
#[derive(Debug, Clone)]
pub struct StreamDbFile {
    path: PathBuf,
    name: String,
    header: StreamDbHeader,
    entries: Vec<StreamDbEntry>,
    by_key: HashMap<u64, Vec<usize>>,
}

impl StreamDbFile {
    /// Open and index a streamdb file
    pub fn open(path: impl AsRef<Path>) -> FormatResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        let mut reader = BufReader::new(file);
        let shard = Self::parse(&mut reader, len, path)?;

        debug!(
            "Indexed {} with {} entries",
            path.display(),
            shard.entries.len()
        );
        Ok(shard)
    }

    /// Parse a streamdb index from a reader of known length.
    ///
    /// `path` is where later payload reads go.
    pub fn parse<R: Read + Seek>(reader: &mut R, len: u64, path: &Path) -> FormatResult<Self> {
        let header = StreamDbHeader::read(reader)?;
        if header.magic != STREAMDB_MAGIC {
            return Err(FormatError::InvalidMagic(header.magic));
        }

        let needed = HEADER_SIZE + u64::from(header.entry_count) * ENTRY_SIZE;
        if needed > len {
            return Err(FormatError::TruncatedEntryTable {
                entry_count: header.entry_count,
                needed,
                available: len,
            });
        }

        let mut entries = Vec::with_capacity(header.entry_count as usize);
        for _ in 0..header.entry_count {
            entries.push(StreamDbEntry::read(reader)?);
        }

        let mut by_key: HashMap<u64, Vec<usize>> = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            by_key.entry(entry.key).or_default().push(i);
        }

        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

        Ok(Self {
            path: path.to_path_buf(),
            name,
            header,
            entries,
            by_key,
        })
    }

    /// Query for a block by key and stored size
    pub fn lookup(&self, key: ShardKey, expected_size: u64) -> ShardLookup {
        let Some(indices) = self.by_key.get(&key.get()) else {
            return ShardLookup::NotFound;
        };

        indices
            .iter()
            .map(|&i| &self.entries[i])
            .find(|entry| u64::from(entry.length) == expected_size)
            .map_or(ShardLookup::SizeMismatch, |entry| {
                ShardLookup::Found(entry.byte_offset())
            })
    }

    /// Read raw block bytes
    pub fn read_at(&self, offset: u64, len: u64) -> FormatResult<Vec<u8>> {
        read_range(&self.path, offset, len)
    }

    /// File name of the shard
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full path of the shard
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parsed header
    pub const fn header(&self) -> &StreamDbHeader {
        &self.header
    }

    /// Entry table in file order
    pub fn entries(&self) -> &[StreamDbEntry] {
        &self.entries
    }
}
