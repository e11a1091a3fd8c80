//! Decompression seam
//!
//! Embedded headers and shard payloads are compressed with a codec this
//! crate does not ship. Callers plug one in through [`Decompressor`]; the
//! bundled [`ZlibCodec`] covers zlib-packed data and test fixtures.

use flate2::read::ZlibDecoder;
use std::io::Read;
use tracing::debug;

/// Maximum allowed decompression size (1 GB)
pub const MAX_DECOMPRESSION_SIZE: usize = 1024 * 1024 * 1024;

/// Inflates a compressed buffer to a known size.
pub trait Decompressor: Send + Sync {
    /// Decompress `data`, expecting exactly `target_size` bytes of output.
    ///
    /// Returns `None` when the data cannot be decoded to that size.
    fn decompress(&self, data: &[u8], target_size: usize) -> Option<Vec<u8>>;
}

impl<D: Decompressor + ?Sized> Decompressor for &D {
    fn decompress(&self, data: &[u8], target_size: usize) -> Option<Vec<u8>> {
        (**self).decompress(data, target_size)
    }
}

impl<D: Decompressor + ?Sized> Decompressor for Box<D> {
    fn decompress(&self, data: &[u8], target_size: usize) -> Option<Vec<u8>> {
        (**self).decompress(data, target_size)
    }
}

/// zlib decompressor backed by flate2
#[derive(Debug, Clone, Copy, Default)]
pub struct ZlibCodec;

impl Decompressor for ZlibCodec {
    fn decompress(&self, data: &[u8], target_size: usize) -> Option<Vec<u8>> {
        if target_size == 0 || target_size > MAX_DECOMPRESSION_SIZE {
            debug!("Refusing zlib target size {target_size}");
            return None;
        }

        let mut output = Vec::with_capacity(target_size);
        // One extra byte so oversized streams are detected instead of truncated
        let mut decoder = ZlibDecoder::new(data).take(target_size as u64 + 1);
        if let Err(e) = decoder.read_to_end(&mut output) {
            debug!("zlib decode failed: {e}");
            return None;
        }

        if output.len() != target_size {
            debug!(
                "zlib output size mismatch: expected {target_size}, got {}",
                output.len()
            );
            return None;
        }
        Some(output)
    }
}
