//! Embedded header decoding

use crate::candidate::Candidate;
use crate::error::CandidateError;
use crate::source::ResourceSource;
use streamdb_formats::{AssetKind, Decompressor, EmbeddedHeader};

/// Recover and parse a candidate's embedded header.
///
/// The header bytes sit in the archive at the entry's offset. When the
/// archive sizes differ they are inflated with `codec`, otherwise they are
/// used as stored.
///
/// # Errors
///
/// Returns the per-candidate failure; the batch continues with the
/// candidate unresolved.
pub fn decode_header<R, D>(
    candidate: &Candidate,
    kind: AssetKind,
    resource: &R,
    codec: &D,
) -> Result<EmbeddedHeader, CandidateError>
where
    R: ResourceSource + ?Sized,
    D: Decompressor + ?Sized,
{
    let stored = resource
        .read_at(candidate.archive_offset, candidate.archive_compressed_size)
        .map_err(CandidateError::HeaderRead)?;

    let raw = if candidate.archive_compressed_size == candidate.archive_decompressed_size {
        stored
    } else {
        let target = candidate.archive_decompressed_size;
        let failed = CandidateError::HeaderDecompress { target };
        let target_size = usize::try_from(target).map_err(|_| failed)?;
        match codec.decompress(&stored, target_size) {
            Some(data) if !data.is_empty() => data,
            _ => return Err(CandidateError::HeaderDecompress { target }),
        }
    };

    kind.layout()
        .parse(&raw)
        .map_err(CandidateError::HeaderParse)
}
