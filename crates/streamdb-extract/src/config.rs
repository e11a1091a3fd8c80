//! Configuration for an extraction run

use crate::filter::Selection;
use crate::{ExportError, ExportResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use streamdb_formats::AssetKind;

/// Shard file extension searched in [`ExportConfig::shard_dir`]
pub const SHARD_EXTENSION: &str = "streamdb";

/// Configuration for an extraction run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Primary `.resources` archive
    pub resource_path: PathBuf,

    /// JSON listing of the archive's entries
    pub entry_listing: PathBuf,

    /// Shard files in priority order
    pub shards: Vec<PathBuf>,

    /// Directory scanned for `*.streamdb` files, appended after `shards`
    /// in name order
    pub shard_dir: Option<PathBuf>,

    /// Root directory for extracted files
    pub output_root: PathBuf,

    /// Directory for `matched.csv` / `unmatched.csv`, reports are off when unset
    pub report_dir: Option<PathBuf>,

    /// Kinds to extract, in order
    pub kinds: Vec<AssetKind>,

    /// JSON selection list restricting what is extracted
    pub selection: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            resource_path: PathBuf::new(),
            entry_listing: PathBuf::new(),
            shards: Vec::new(),
            shard_dir: None,
            output_root: PathBuf::from("./exported"),
            report_dir: None,
            kinds: AssetKind::ALL.to_vec(),
            selection: None,
        }
    }
}

impl ExportConfig {
    /// Create a configuration for one archive and its entry listing
    pub fn new<P: AsRef<Path>, L: AsRef<Path>>(resource_path: P, entry_listing: L) -> Self {
        Self {
            resource_path: resource_path.as_ref().to_path_buf(),
            entry_listing: entry_listing.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_file(path: impl AsRef<Path>) -> ExportResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|source| ExportError::InvalidJson {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Append a shard file
    #[must_use]
    pub fn with_shard<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.shards.push(path.as_ref().to_path_buf());
        self
    }

    /// Replace the shard file list
    #[must_use]
    pub fn with_shards(mut self, shards: Vec<PathBuf>) -> Self {
        self.shards = shards;
        self
    }

    /// Set the directory scanned for shard files
    #[must_use]
    pub fn with_shard_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.shard_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Set the output root
    #[must_use]
    pub fn with_output_root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_root = path.as_ref().to_path_buf();
        self
    }

    /// Enable reports in `dir`
    #[must_use]
    pub fn with_report_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.report_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Set the kinds to extract
    #[must_use]
    pub fn with_kinds(mut self, kinds: Vec<AssetKind>) -> Self {
        self.kinds = kinds;
        self
    }

    /// Restrict extraction to a selection list
    #[must_use]
    pub fn with_selection<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.selection = Some(path.as_ref().to_path_buf());
        self
    }

    /// Shard files in priority order: the explicit list, then the files
    /// found in `shard_dir` sorted by name
    ///
    /// # Errors
    ///
    /// Returns error if `shard_dir` cannot be listed
    pub fn shard_paths(&self) -> ExportResult<Vec<PathBuf>> {
        let mut paths = self.shards.clone();

        if let Some(dir) = &self.shard_dir {
            let mut found = Vec::new();
            for entry in fs::read_dir(dir)? {
                let path = entry?.path();
                let is_shard = path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(SHARD_EXTENSION));
                if is_shard && path.is_file() && !paths.contains(&path) {
                    found.push(path);
                }
            }
            found.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
            paths.extend(found);
        }

        Ok(paths)
    }

    /// Load the selection list, if one is configured
    ///
    /// # Errors
    ///
    /// Returns error if the list cannot be read or parsed
    pub fn load_selection(&self) -> ExportResult<Option<Selection>> {
        self.selection.as_ref().map(Selection::from_file).transpose()
    }

    /// Check the configuration before a run
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Config`] naming the first problem found
    pub fn validate(&self) -> ExportResult<()> {
        if !self.resource_path.is_file() {
            return Err(ExportError::Config(format!(
                "resource archive not found: {}",
                self.resource_path.display()
            )));
        }
        if !self.entry_listing.is_file() {
            return Err(ExportError::Config(format!(
                "entry listing not found: {}",
                self.entry_listing.display()
            )));
        }
        if let Some(dir) = &self.shard_dir
            && !dir.is_dir()
        {
            return Err(ExportError::Config(format!(
                "shard directory not found: {}",
                dir.display()
            )));
        }
        if let Some(selection) = &self.selection
            && !selection.is_file()
        {
            return Err(ExportError::Config(format!(
                "selection list not found: {}",
                selection.display()
            )));
        }
        if self.kinds.is_empty() {
            return Err(ExportError::Config("no asset kinds requested".to_string()));
        }
        if self.output_root.as_os_str().is_empty() {
            return Err(ExportError::Config("output root is empty".to_string()));
        }

        let shards = self.shard_paths()?;
        if shards.is_empty() {
            return Err(ExportError::Config("no shard files configured".to_string()));
        }
        if let Some(missing) = shards.iter().find(|path| !path.is_file()) {
            return Err(ExportError::Config(format!(
                "shard file not found: {}",
                missing.display()
            )));
        }

        Ok(())
    }
}
