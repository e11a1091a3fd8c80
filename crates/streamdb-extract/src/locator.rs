//! Shard locator
//!
//! Resolves a lookup key across an ordered shard list. The primary scan
//! queries the key in every shard and, when a shard holds the key with a
//! different size, retries key + 1 in that same shard. If nothing matched,
//! a fallback scan queries key - 1 in every shard. First match wins in both
//! passes.

use crate::candidate::{LookupPass, ShardLocation};
use crate::source::ShardSource;
use streamdb_formats::{ShardKey, ShardLookup};
use tracing::trace;

/// Locate `key` with payload size `compressed_size` in `shards`
pub fn locate<S: ShardSource>(
    key: ShardKey,
    compressed_size: u64,
    shards: &[S],
) -> Option<ShardLocation> {
    primary_scan(key, compressed_size, shards)
        .or_else(|| fallback_scan(key, compressed_size, shards))
}

fn primary_scan<S: ShardSource>(
    key: ShardKey,
    compressed_size: u64,
    shards: &[S],
) -> Option<ShardLocation> {
    for (shard_id, shard) in shards.iter().enumerate() {
        match shard.lookup(key, compressed_size) {
            ShardLookup::Found(offset) => {
                return Some(location(shard_id, shard, offset, key, LookupPass::Direct));
            }
            ShardLookup::SizeMismatch => {
                let retry = key.next();
                trace!("{key} size mismatch in {}, retrying {retry}", shard.name());
                if let ShardLookup::Found(offset) = shard.lookup(retry, compressed_size) {
                    return Some(location(
                        shard_id,
                        shard,
                        offset,
                        retry,
                        LookupPass::CollisionRetry,
                    ));
                }
            }
            ShardLookup::NotFound => {}
        }
    }
    None
}

fn fallback_scan<S: ShardSource>(
    key: ShardKey,
    compressed_size: u64,
    shards: &[S],
) -> Option<ShardLocation> {
    let key = key.prev();
    shards.iter().enumerate().find_map(|(shard_id, shard)| {
        match shard.lookup(key, compressed_size) {
            ShardLookup::Found(offset) => Some(location(
                shard_id,
                shard,
                offset,
                key,
                LookupPass::OffByOne,
            )),
            ShardLookup::SizeMismatch | ShardLookup::NotFound => None,
        }
    })
}

fn location<S: ShardSource>(
    shard_id: usize,
    shard: &S,
    offset: u64,
    matched_key: ShardKey,
    pass: LookupPass,
) -> ShardLocation {
    ShardLocation {
        shard_id,
        shard_name: shard.name().to_string(),
        offset,
        matched_key,
        pass,
    }
}
