//! Binary layouts and key derivation for streamdb game data
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_possible_wrap)] // Intentional for binary operations
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
//! The primary `.resources` archive lists logical files (entries) but only
//! carries a small embedded header for each of them. The payload bytes live
//! in a set of `.streamdb` shard files, addressed by a 64-bit key derived from
//! the entry's content hash.
//!
//! This crate provides the pieces that do not touch the output side:
//!
//! - **Entries**: [`ArchiveEntry`] records and the three handled [`AssetKind`]s
//! - **Header layouts**: per-kind [`HeaderLayout`] descriptors and the decoded
//!   [`EmbeddedHeader`]
//! - **Keys**: the content-hash to [`ShardKey`] transform
//! - **StreamDB**: shard index parsing and [`ShardLookup`] queries
//! - **DDS**: the constant image container template
//! - **Codec**: the [`Decompressor`] seam and a zlib implementation
//!
//! # Example
//!
//! ```
//! use streamdb_formats::{AssetKind, ShardKey};
//!
//! let key = ShardKey::derive(0x0123_4567_89ab_cdef, AssetKind::AnimatedModel.fixed_mip_count());
//! println!("lookup key: {key}");
//! ```

#![warn(missing_docs)]

pub mod codec;
pub mod dds;
pub mod entry;
pub mod error;
pub mod key;
pub mod layout;
pub mod read;
pub mod streamdb;

pub use codec::{Decompressor, ZlibCodec};
pub use entry::{ArchiveEntry, AssetKind};
pub use error::{FormatError, FormatResult};
pub use key::ShardKey;
pub use layout::{EmbeddedHeader, FieldPos, HeaderLayout, ImageFields, ImageInfo};
pub use read::read_range;
pub use streamdb::{ShardLookup, StreamDbEntry, StreamDbFile, StreamDbHeader};
