//! Extraction assembler: resolved candidates to files on disk

use crate::candidate::Candidate;
use crate::error::CandidateError;
use crate::export_list::ExportList;
use crate::source::ShardSource;
use serde::Serialize;
use std::fs;
use std::ops::{Add, AddAssign};
use std::path::{Component, Path, PathBuf};
use streamdb_formats::{AssetKind, Decompressor, dds};
use tracing::{debug, info, warn};

/// Per-batch outcome counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchCounters {
    /// Files written
    pub written: u64,
    /// Candidates without a shard location
    pub not_found: u64,
    /// Resolved candidates that failed to read, decompress or write
    pub errors: u64,
}

impl BatchCounters {
    /// Total candidates accounted for
    pub const fn total(&self) -> u64 {
        self.written + self.not_found + self.errors
    }

    const fn written() -> Self {
        Self {
            written: 1,
            not_found: 0,
            errors: 0,
        }
    }

    const fn not_found() -> Self {
        Self {
            written: 0,
            not_found: 1,
            errors: 0,
        }
    }

    const fn error() -> Self {
        Self {
            written: 0,
            not_found: 0,
            errors: 1,
        }
    }
}

impl Add for BatchCounters {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            written: self.written + rhs.written,
            not_found: self.not_found + rhs.not_found,
            errors: self.errors + rhs.errors,
        }
    }
}

impl AddAssign for BatchCounters {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Writes resolved candidates under an output root
pub struct Assembler<'a, D: ?Sized> {
    output_root: &'a Path,
    codec: &'a D,
}

impl<'a, D: Decompressor + ?Sized> Assembler<'a, D> {
    /// Create an assembler writing under `output_root`
    pub const fn new(output_root: &'a Path, codec: &'a D) -> Self {
        Self { output_root, codec }
    }

    /// Extract every resolved candidate of `list`
    pub fn export<S: ShardSource>(&self, list: &ExportList, shards: &[S]) -> BatchCounters {
        let kind = list.kind();
        info!("Extracting {} {} candidates", list.len(), kind);

        #[cfg(feature = "parallel")]
        let counters = {
            use rayon::prelude::*;

            list.candidates()
                .par_iter()
                .map(|candidate| self.export_one(candidate, kind, shards))
                .reduce(BatchCounters::default, Add::add)
        };

        #[cfg(not(feature = "parallel"))]
        let counters = list
            .candidates()
            .iter()
            .map(|candidate| self.export_one(candidate, kind, shards))
            .fold(BatchCounters::default(), Add::add);

        info!(
            "{}: {} written, {} not found, {} errors",
            kind, counters.written, counters.not_found, counters.errors
        );
        counters
    }

    fn export_one<S: ShardSource>(
        &self,
        candidate: &Candidate,
        kind: AssetKind,
        shards: &[S],
    ) -> BatchCounters {
        if !candidate.is_resolved() {
            return BatchCounters::not_found();
        }

        let result = self
            .assemble(candidate, kind, shards)
            .and_then(|bytes| self.write(&candidate.name, &bytes));

        match result {
            Ok(path) => {
                debug!("Wrote {}", path.display());
                BatchCounters::written()
            }
            Err(e) => {
                warn!("{}: {e}", candidate.name);
                BatchCounters::error()
            }
        }
    }

    /// Build the output bytes of a resolved candidate
    ///
    /// # Errors
    ///
    /// Returns error if the payload cannot be read or decompressed, or the
    /// image fields do not fit the DDS header
    pub fn assemble<S: ShardSource>(
        &self,
        candidate: &Candidate,
        kind: AssetKind,
        shards: &[S],
    ) -> Result<Vec<u8>, CandidateError> {
        let location = candidate
            .location
            .as_ref()
            .ok_or(CandidateError::NotResolved)?;
        let shard = shards
            .get(location.shard_id)
            .ok_or(CandidateError::NotResolved)?;

        let compressed_size = candidate.compressed_size();
        let decompressed_size = candidate.decompressed_size();
        let stored = shard
            .read_at(location.offset, compressed_size)
            .map_err(CandidateError::PayloadRead)?;

        let payload = if compressed_size == decompressed_size {
            stored
        } else {
            let failed = || CandidateError::PayloadDecompress {
                target: decompressed_size,
            };
            let target_size = usize::try_from(decompressed_size).map_err(|_| failed())?;
            match self.codec.decompress(&stored, target_size) {
                Some(data) if !data.is_empty() => data,
                _ => return Err(failed()),
            }
        };

        match candidate.image() {
            Some(image) if kind.has_container_header() => {
                let size = u32::try_from(decompressed_size)
                    .map_err(|_| CandidateError::ContainerField(decompressed_size))?;
                let header = dds::image_header(image.width, image.height, size);

                let mut output = Vec::with_capacity(header.len() + payload.len());
                output.extend_from_slice(&header);
                output.extend_from_slice(&payload);
                Ok(output)
            }
            _ => Ok(payload),
        }
    }

    /// Write `bytes` to the output root joined with `name`
    ///
    /// # Errors
    ///
    /// Returns error if `name` escapes the output root or the file cannot
    /// be written
    pub fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, CandidateError> {
        let path = output_path(self.output_root, name)?;
        let write_err = |source| CandidateError::Write {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(&path, bytes).map_err(write_err)?;
        Ok(path)
    }
}

/// Join a logical name onto the output root, rejecting names that are
/// absolute, empty or step outside the root
pub fn output_path(root: &Path, name: &str) -> Result<PathBuf, CandidateError> {
    let mut path = root.to_path_buf();
    let mut depth = 0usize;

    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => {
                path.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(CandidateError::UnsafePath(name.to_string()));
            }
        }
    }

    if depth == 0 {
        return Err(CandidateError::UnsafePath(name.to_string()));
    }
    Ok(path)
}
