//! Export list: the resolved candidate arena for one asset kind

use crate::candidate::Candidate;
use crate::filter::{Selection, select_candidates};
use crate::header::decode_header;
use crate::locator::locate;
use crate::source::{ResourceSource, ShardSource};
use streamdb_formats::{AssetKind, Decompressor, ShardKey};
use tracing::{debug, info, warn};

/// Candidates of one kind after filtering, header decoding, key
/// calculation and location
#[derive(Debug)]
pub struct ExportList {
    kind: AssetKind,
    candidates: Vec<Candidate>,
}

impl ExportList {
    /// Run the entry filter, header decoder, key calculator and locator
    /// for `kind`
    pub fn build<R, S, D>(
        kind: AssetKind,
        resource: &R,
        shards: &[S],
        codec: &D,
        selection: Option<&Selection>,
    ) -> Self
    where
        R: ResourceSource + ?Sized,
        S: ShardSource,
        D: Decompressor + ?Sized,
    {
        let mut candidates = select_candidates(resource.entries(), kind, selection);
        info!("Resolving {} {} candidates", candidates.len(), kind);

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            candidates
                .par_iter_mut()
                .for_each(|candidate| resolve(candidate, kind, resource, shards, codec));
        }

        #[cfg(not(feature = "parallel"))]
        {
            for candidate in &mut candidates {
                resolve(candidate, kind, resource, shards, codec);
            }
        }

        let list = Self { kind, candidates };
        info!(
            "{}: {} resolved, {} unresolved",
            kind,
            list.resolved().count(),
            list.unresolved().count()
        );
        list
    }

    /// Wrap an already resolved arena
    pub const fn from_candidates(kind: AssetKind, candidates: Vec<Candidate>) -> Self {
        Self { kind, candidates }
    }

    /// Asset kind of every candidate
    pub const fn kind(&self) -> AssetKind {
        self.kind
    }

    /// Every candidate in entry order
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether no entry matched the filter
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidates with a shard location
    pub fn resolved(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().filter(|c| c.is_resolved())
    }

    /// Candidates without a shard location
    pub fn unresolved(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().filter(|c| !c.is_resolved())
    }

    /// Output bytes needed to write every resolved candidate
    pub fn required_bytes(&self) -> u64 {
        self.resolved()
            .fold(0u64, |total, c| total.saturating_add(c.decompressed_size()))
    }
}

fn resolve<R, S, D>(
    candidate: &mut Candidate,
    kind: AssetKind,
    resource: &R,
    shards: &[S],
    codec: &D,
) where
    R: ResourceSource + ?Sized,
    S: ShardSource,
    D: Decompressor + ?Sized,
{
    let header = match decode_header(candidate, kind, resource, codec) {
        Ok(header) => header,
        Err(e) => {
            warn!("{}: {e}", candidate.name);
            candidate.header_error = Some(e);
            return;
        }
    };

    let mip_count = header
        .image
        .map_or(kind.fixed_mip_count(), |image| image.mip_count);
    let key = ShardKey::derive(candidate.hash, mip_count);
    candidate.header = Some(header);
    candidate.lookup_key = Some(key);
    candidate.location = locate(key, header.compressed_size, shards);

    match &candidate.location {
        Some(loc) => debug!(
            "{} -> {}@{:#x} ({:?}, key {})",
            candidate.name, loc.shard_name, loc.offset, loc.pass, loc.matched_key
        ),
        None => debug!("{} unresolved (key {key})", candidate.name),
    }
}
