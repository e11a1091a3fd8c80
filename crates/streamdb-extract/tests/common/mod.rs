//! Shared fixtures: on-disk archives, listings and shards

#![allow(dead_code)]
#![allow(clippy::expect_used)]

use binrw::BinWriterExt;
use flate2::{Compression, write::ZlibEncoder};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use streamdb_formats::{ArchiveEntry, AssetKind, ShardKey, StreamDbEntry, StreamDbHeader};

/// zlib-compress `data`
pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("compress");
    encoder.finish().expect("finish")
}

/// Embedded image header: 63-byte image header plus one mip descriptor
pub fn image_header(
    width: u32,
    height: u32,
    mips: i32,
    decompressed: u32,
    compressed: u32,
) -> Vec<u8> {
    let flag: u32 = u32::from(decompressed != compressed);
    let mut header = vec![0u8; 0x5F];
    header[0x0C..0x10].copy_from_slice(&width.to_le_bytes());
    header[0x10..0x14].copy_from_slice(&height.to_le_bytes());
    header[0x18..0x1C].copy_from_slice(&mips.to_le_bytes());
    header[0x53..0x57].copy_from_slice(&decompressed.to_le_bytes());
    header[0x57..0x5B].copy_from_slice(&flag.to_le_bytes());
    header[0x5B..0x5F].copy_from_slice(&compressed.to_le_bytes());
    header
}

/// Embedded model header with the size pair at the kind's tail offsets
pub fn model_header(kind: AssetKind, decompressed: u32, compressed: u32) -> Vec<u8> {
    let (len, at) = match kind {
        AssetKind::AnimatedModel => (24, 8),
        _ => (20, 8),
    };
    let mut header = vec![0x11u8; len];
    header[at..at + 4].copy_from_slice(&decompressed.to_le_bytes());
    header[at + 4..at + 8].copy_from_slice(&compressed.to_le_bytes());
    header
}

/// Builds a `.resources` file and its entry listing
#[derive(Default)]
pub struct ArchiveBuilder {
    data: Vec<u8>,
    entries: Vec<ArchiveEntry>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry whose embedded header is stored as given
    pub fn raw(mut self, name: &str, kind: AssetKind, hash: u64, header: &[u8]) -> Self {
        self.push(name, kind, hash, header, header.len() as u64);
        self
    }

    /// Add an entry whose embedded header is zlib-compressed
    pub fn packed(mut self, name: &str, kind: AssetKind, hash: u64, header: &[u8]) -> Self {
        let stored = zlib(header);
        self.push(name, kind, hash, &stored, header.len() as u64);
        self
    }

    /// Add an entry with arbitrary stored bytes and declared inflated size
    pub fn stored(
        mut self,
        name: &str,
        kind: AssetKind,
        hash: u64,
        stored: &[u8],
        decompressed: u64,
    ) -> Self {
        self.push(name, kind, hash, stored, decompressed);
        self
    }

    fn push(&mut self, name: &str, kind: AssetKind, hash: u64, stored: &[u8], decompressed: u64) {
        // Something in front so offsets are never zero
        if self.data.is_empty() {
            self.data.extend_from_slice(b"IDCL");
        }
        self.entries.push(ArchiveEntry {
            name: name.to_string(),
            type_tag: kind.type_tag(),
            data_offset: self.data.len() as u64,
            compressed_size: stored.len() as u64,
            decompressed_size: decompressed,
            hash,
        });
        self.data.extend_from_slice(stored);
    }

    /// Write `<stem>.resources` and `<stem>.json` into `dir`
    pub fn write(&self, dir: &Path, stem: &str) -> (PathBuf, PathBuf) {
        let resources = dir.join(format!("{stem}.resources"));
        let listing = dir.join(format!("{stem}.json"));
        fs::write(&resources, &self.data).expect("write resources");
        let json = serde_json::to_vec(&self.entries).expect("listing");
        fs::write(&listing, json).expect("write listing");
        (resources, listing)
    }
}

/// Builds a `.streamdb` shard
#[derive(Default)]
pub struct ShardBuilder {
    blocks: Vec<(u64, Vec<u8>)>,
}

impl ShardBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a block under `key`
    pub fn block(mut self, key: ShardKey, data: &[u8]) -> Self {
        self.blocks.push((key.get(), data.to_vec()));
        self
    }

    /// Serialize: header, entry table, 16-byte aligned blocks
    pub fn to_bytes(&self) -> Vec<u8> {
        let header = StreamDbHeader::new(self.blocks.len() as u32);
        let mut offset = align16(u64::from(header.data_start));

        let mut entries = Vec::with_capacity(self.blocks.len());
        for (key, data) in &self.blocks {
            entries.push(StreamDbEntry {
                key: *key,
                offset_div16: (offset / 16) as u32,
                length: data.len() as u32,
            });
            offset = align16(offset + data.len() as u64);
        }

        let mut cursor = Cursor::new(Vec::new());
        cursor.write_le(&header).expect("header");
        for entry in &entries {
            cursor.write_le(entry).expect("entry");
        }

        let mut bytes = cursor.into_inner();
        for (entry, (_, data)) in entries.iter().zip(&self.blocks) {
            bytes.resize(entry.byte_offset() as usize, 0);
            bytes.extend_from_slice(data);
        }
        bytes
    }

    /// Write the shard to `path`
    pub fn write(&self, path: &Path) -> PathBuf {
        fs::write(path, self.to_bytes()).expect("write shard");
        path.to_path_buf()
    }
}

const fn align16(value: u64) -> u64 {
    value.div_ceil(16) * 16
}

/// Lookup key of a non-image entry
pub fn model_key(hash: u64) -> ShardKey {
    ShardKey::derive(hash, AssetKind::FIXED_MIP_COUNT)
}
