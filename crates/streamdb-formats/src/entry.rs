//! Resource archive entries and the asset kinds we know how to extract

use crate::layout::HeaderLayout;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One file listed in a `.resources` archive.
///
/// The archive's directory parser produces these; nothing here mutates them.
/// `data_offset` and the two sizes describe the small embedded header stored
/// in the archive, not the streamed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// Logical path, e.g. `art/tile/foo.tga$bc7$mtlkind=albedo`
    pub name: String,
    /// Resource type tag (the entry "version" field in the archive)
    pub type_tag: u32,
    /// Offset of the embedded header in the archive file
    pub data_offset: u64,
    /// Stored size of the embedded header
    pub compressed_size: u64,
    /// Size of the embedded header once inflated
    pub decompressed_size: u64,
    /// 64-bit content hash, in archive byte order
    pub hash: u64,
}

/// Asset kinds handled by the extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Texture data, written as DDS
    Image,
    /// Skinned mesh (`.md6mesh`) data
    AnimatedModel,
    /// Static mesh (`.lwo`) data
    StaticModel,
}

impl AssetKind {
    /// All handled kinds in export order
    pub const ALL: [Self; 3] = [Self::Image, Self::AnimatedModel, Self::StaticModel];

    /// Mip count used for key derivation by kinds that carry none
    pub const FIXED_MIP_COUNT: i32 = -6;

    /// Archive type tag for this kind
    pub const fn type_tag(self) -> u32 {
        match self {
            Self::Image => 21,
            Self::AnimatedModel => 31,
            Self::StaticModel => 67,
        }
    }

    /// Look up a kind by archive type tag
    pub const fn from_type_tag(tag: u32) -> Option<Self> {
        match tag {
            21 => Some(Self::Image),
            31 => Some(Self::AnimatedModel),
            67 => Some(Self::StaticModel),
            _ => None,
        }
    }

    /// Embedded header layout for this kind
    pub const fn layout(self) -> &'static HeaderLayout {
        match self {
            Self::Image => &HeaderLayout::IMAGE,
            Self::AnimatedModel => &HeaderLayout::ANIMATED_MODEL,
            Self::StaticModel => &HeaderLayout::STATIC_MODEL,
        }
    }

    /// Mip count fed to key derivation when the header has no mip field
    pub const fn fixed_mip_count(self) -> i32 {
        Self::FIXED_MIP_COUNT
    }

    /// Whether extracted files get a synthesized DDS header
    pub const fn has_container_header(self) -> bool {
        matches!(self, Self::Image)
    }

    /// Short name used in configuration and selection lists
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::AnimatedModel => "animated_model",
            Self::StaticModel => "static_model",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" | "tga" => Ok(Self::Image),
            "animated_model" | "md6" => Ok(Self::AnimatedModel),
            "static_model" | "lwo" => Ok(Self::StaticModel),
            other => Err(format!("unknown asset kind: {other}")),
        }
    }
}
