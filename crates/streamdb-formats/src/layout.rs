//! Embedded header layouts
//!
//! Each archive entry carries a small header describing the streamed payload.
//! The extraction pipeline is the same for every kind; only the position of
//! the fields differs, so each kind is described by a [`HeaderLayout`] table
//! instead of its own parser.
//!
//! All fields are 4-byte little-endian integers.
//!
//! Image headers (offsets from the start):
//!
//! | Offset | Field |
//! |--------|-------|
//! | 0x0C   | Pixel width |
//! | 0x10   | Pixel height |
//! | 0x18   | Mip count (signed) |
//! | 0x53   | Largest mip: decompressed size |
//! | 0x57   | Largest mip: compressed flag |
//! | 0x5B   | Largest mip: compressed size |
//!
//! The image fields after 0x3F belong to the first 36-byte mip descriptor
//! that follows the 63-byte image header. Model headers keep their stream
//! description in the trailing bytes, so their fields are anchored at the end.

use crate::error::{FormatError, FormatResult};

const FIELD_WIDTH: usize = 4;

/// Position of a 4-byte field inside an embedded header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPos {
    /// Byte offset from the first byte of the header
    FromStart(usize),
    /// Distance of the field's first byte from the end of the header
    FromEnd(usize),
}

impl FieldPos {
    /// Minimum header length that contains this field
    pub const fn min_len(self) -> usize {
        match self {
            Self::FromStart(offset) => offset + FIELD_WIDTH,
            Self::FromEnd(distance) => {
                if distance < FIELD_WIDTH {
                    FIELD_WIDTH
                } else {
                    distance
                }
            }
        }
    }

    fn read_u32(self, data: &[u8]) -> FormatResult<u32> {
        let start = match self {
            Self::FromStart(offset) => Some(offset),
            Self::FromEnd(distance) => data.len().checked_sub(distance),
        };
        let bytes = start
            .and_then(|s| data.get(s..s.checked_add(FIELD_WIDTH)?))
            .ok_or(FormatError::HeaderTooShort {
                needed: self.min_len(),
                actual: data.len(),
            })?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

/// Field positions for one asset kind's embedded header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLayout {
    /// Streamed payload size after decompression
    pub decompressed_size: FieldPos,
    /// Streamed payload size as stored in the shard
    pub compressed_size: FieldPos,
    /// Compression flag (value 1 means compressed); absent means always compressed
    pub compressed_flag: Option<FieldPos>,
    /// Image metadata fields, absent for non-image kinds
    pub image: Option<ImageFields>,
}

/// Field positions of image-only metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageFields {
    /// Pixel width
    pub width: FieldPos,
    /// Pixel height
    pub height: FieldPos,
    /// Mip level count
    pub mip_count: FieldPos,
}

impl HeaderLayout {
    /// Layout of embedded image headers
    pub const IMAGE: Self = Self {
        decompressed_size: FieldPos::FromStart(0x53),
        compressed_size: FieldPos::FromStart(0x5B),
        compressed_flag: Some(FieldPos::FromStart(0x57)),
        image: Some(ImageFields {
            width: FieldPos::FromStart(0x0C),
            height: FieldPos::FromStart(0x10),
            mip_count: FieldPos::FromStart(0x18),
        }),
    };

    /// Layout of embedded `.md6mesh` headers
    pub const ANIMATED_MODEL: Self = Self {
        decompressed_size: FieldPos::FromEnd(0x10),
        compressed_size: FieldPos::FromEnd(0x0C),
        compressed_flag: None,
        image: None,
    };

    /// Layout of embedded `.lwo` headers
    pub const STATIC_MODEL: Self = Self {
        decompressed_size: FieldPos::FromEnd(0x0C),
        compressed_size: FieldPos::FromEnd(0x08),
        compressed_flag: None,
        image: None,
    };

    /// Minimum header length this layout can be read from
    pub fn min_len(&self) -> usize {
        let mut fields = vec![self.decompressed_size, self.compressed_size];
        fields.extend(self.compressed_flag);
        if let Some(image) = self.image {
            fields.extend([image.width, image.height, image.mip_count]);
        }
        fields.into_iter().map(FieldPos::min_len).max().unwrap_or(0)
    }

    /// Decode a recovered (already inflated) embedded header
    pub fn parse(&self, data: &[u8]) -> FormatResult<EmbeddedHeader> {
        let needed = self.min_len();
        if data.len() < needed {
            return Err(FormatError::HeaderTooShort {
                needed,
                actual: data.len(),
            });
        }

        let is_compressed = match self.compressed_flag {
            Some(pos) => pos.read_u32(data)? == 1,
            None => true,
        };

        let image = match self.image {
            Some(fields) => Some(ImageInfo {
                width: fields.width.read_u32(data)?,
                height: fields.height.read_u32(data)?,
                mip_count: fields.mip_count.read_u32(data)? as i32,
            }),
            None => None,
        };

        Ok(EmbeddedHeader {
            compressed_size: u64::from(self.compressed_size.read_u32(data)?),
            decompressed_size: u64::from(self.decompressed_size.read_u32(data)?),
            is_compressed,
            image,
        })
    }
}

/// Image metadata recovered from an embedded header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
    /// Mip level count
    pub mip_count: i32,
}

/// Decoded embedded header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedHeader {
    /// Payload size in the shard
    pub compressed_size: u64,
    /// Payload size once inflated
    pub decompressed_size: u64,
    /// Whether the header marks the payload as compressed
    pub is_compressed: bool,
    /// Image metadata (image kind only)
    pub image: Option<ImageInfo>,
}

impl EmbeddedHeader {
    /// Compression type tag used in reports (2 = compressed, 0 = stored)
    pub const fn compression_type(&self) -> u8 {
        if self.is_compressed { 2 } else { 0 }
    }
}
