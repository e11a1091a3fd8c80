//! Free-space check run before any output is written

use crate::export_list::ExportList;
use crate::{ExportError, ExportResult};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Reports free bytes on the volume holding a path
pub trait SpaceProbe {
    /// Free bytes for `path`, `None` when no volume could be matched
    fn available_space(&self, path: &Path) -> Option<u64>;
}

/// Probe backed by the system disk list
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSpace;

impl SpaceProbe for SystemSpace {
    fn available_space(&self, path: &Path) -> Option<u64> {
        let disks = sysinfo::Disks::new_with_refreshed_list();
        let search_path = existing_ancestor(path);

        // Longest mount point containing the path wins
        disks
            .list()
            .iter()
            .filter(|disk| search_path.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().as_os_str().len())
            .map(sysinfo::Disk::available_space)
    }
}

/// Probe returning a fixed amount of free space
#[derive(Debug, Clone, Copy)]
pub struct FixedSpace(pub u64);

impl SpaceProbe for FixedSpace {
    fn available_space(&self, _path: &Path) -> Option<u64> {
        Some(self.0)
    }
}

/// Canonical form of the closest existing ancestor; the output root may not
/// exist yet. Relative paths are taken from the working directory.
fn existing_ancestor(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let canonical = absolute
        .ancestors()
        .find_map(|ancestor| ancestor.canonicalize().ok());
    canonical.unwrap_or(absolute)
}

/// Bytes needed to write every resolved candidate of every list
pub fn required_space(lists: &[ExportList]) -> u64 {
    lists
        .iter()
        .fold(0u64, |total, list| total.saturating_add(list.required_bytes()))
}

/// Fail when `destination` cannot hold the resolved candidates of `lists`
///
/// # Errors
///
/// Returns [`ExportError::InsufficientSpace`] when the free space is below
/// the summed decompressed size
pub fn check_free_space<P: SpaceProbe + ?Sized>(
    lists: &[ExportList],
    destination: &Path,
    probe: &P,
) -> ExportResult<()> {
    let required = required_space(lists);

    let Some(available) = probe.available_space(destination) else {
        warn!(
            "Could not determine free space for {}, skipping check",
            destination.display()
        );
        return Ok(());
    };

    info!(
        "Export needs {:.2} MB, {:.2} MB free on {}",
        megabytes(required),
        megabytes(available),
        destination.display()
    );

    if available < required {
        return Err(ExportError::InsufficientSpace {
            destination: destination.to_path_buf(),
            required,
            available,
        });
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::candidate::{Candidate, LookupPass, ShardLocation};
    use streamdb_formats::{ArchiveEntry, AssetKind, EmbeddedHeader, ShardKey};

    fn candidate(decompressed_size: u64, resolved: bool) -> Candidate {
        let mut candidate = Candidate::from_entry(&ArchiveEntry {
            name: "x".to_string(),
            type_tag: 67,
            data_offset: 0,
            compressed_size: 1,
            decompressed_size: 1,
            hash: 0,
        });
        candidate.header = Some(EmbeddedHeader {
            compressed_size: 1,
            decompressed_size,
            is_compressed: true,
            image: None,
        });
        if resolved {
            candidate.location = Some(ShardLocation {
                shard_id: 0,
                shard_name: "a.streamdb".to_string(),
                offset: 0,
                matched_key: ShardKey::new(0),
                pass: LookupPass::Direct,
            });
        }
        candidate
    }

    fn lists() -> Vec<ExportList> {
        vec![
            ExportList::from_candidates(
                AssetKind::Image,
                vec![candidate(1000, true), candidate(5000, false)],
            ),
            ExportList::from_candidates(AssetKind::StaticModel, vec![candidate(24, true)]),
        ]
    }

    #[test]
    fn test_only_resolved_sizes_count() {
        assert_eq!(required_space(&lists()), 1024);
    }

    #[test]
    fn test_insufficient_space_is_fatal() {
        let err = check_free_space(&lists(), Path::new("/out"), &FixedSpace(1023))
            .expect_err("not enough space");

        assert!(matches!(
            err,
            ExportError::InsufficientSpace {
                required: 1024,
                available: 1023,
                ..
            }
        ));
    }

    #[test]
    fn test_exact_space_is_enough() {
        check_free_space(&lists(), Path::new("/out"), &FixedSpace(1024)).expect("fits");
    }

    #[test]
    fn test_existing_ancestor_for_missing_dir() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("not/yet/created");

        assert_eq!(
            existing_ancestor(&missing),
            dir.path().canonicalize().expect("canonical")
        );
    }

    #[test]
    fn test_existing_ancestor_for_missing_relative_dir() {
        let missing = Path::new("streamdb_extract_missing_output/nested");
        let cwd = std::env::current_dir()
            .expect("working directory")
            .canonicalize()
            .expect("canonical");

        let ancestor = existing_ancestor(missing);
        assert!(ancestor.is_absolute());
        assert_eq!(ancestor, cwd);
    }
}
