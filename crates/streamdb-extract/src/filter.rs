//! Entry filter: archive entries to candidates for one kind

use crate::candidate::Candidate;
use crate::{ExportError, ExportResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use streamdb_formats::{ArchiveEntry, AssetKind};
use tracing::debug;

/// Path marker of pre-baked lighting probe images
pub const LIGHTPROBE_MARKER: &str = "/lightprobes/";

/// Path marker of minimum-mip placeholder images
pub const MINMIP_MARKER: &str = "$minmip=";

/// User-chosen subset of entry names, per kind.
///
/// Serialized as a JSON object of kind name to name array:
/// `{"image": ["art/a.tga"], "static_model": []}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    names: BTreeMap<AssetKind, BTreeSet<String>>,
}

impl Selection {
    /// Empty selection (selects nothing)
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a selection list from JSON
    pub fn from_file(path: impl AsRef<Path>) -> ExportResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|source| ExportError::InvalidJson {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Add a name for a kind
    pub fn insert(&mut self, kind: AssetKind, name: impl Into<String>) {
        self.names.entry(kind).or_default().insert(name.into());
    }

    /// Names selected for a kind, `None` when the kind is not listed at all
    pub fn names_for(&self, kind: AssetKind) -> Option<&BTreeSet<String>> {
        self.names.get(&kind)
    }
}

/// Build the candidate arena for `kind`.
///
/// With a selection, only listed names of listed kinds pass.
pub fn select_candidates(
    entries: &[ArchiveEntry],
    kind: AssetKind,
    selection: Option<&Selection>,
) -> Vec<Candidate> {
    let allowed = match selection {
        Some(selection) => match selection.names_for(kind) {
            Some(names) => Some(names),
            None => return Vec::new(),
        },
        None => None,
    };

    let candidates: Vec<Candidate> = entries
        .iter()
        .filter(|entry| is_extractable(entry, kind))
        .filter(|entry| allowed.is_none_or(|names| names.contains(&entry.name)))
        .map(Candidate::from_entry)
        .collect();

    debug!(
        "Selected {} {} candidates from {} entries",
        candidates.len(),
        kind,
        entries.len()
    );
    candidates
}

fn is_extractable(entry: &ArchiveEntry, kind: AssetKind) -> bool {
    if entry.type_tag != kind.type_tag() || entry.compressed_size == 0 {
        return false;
    }

    // These images carry no usable embedded header
    if kind == AssetKind::Image
        && (entry.name.contains(LIGHTPROBE_MARKER) || entry.name.contains(MINMIP_MARKER))
    {
        return false;
    }

    true
}
