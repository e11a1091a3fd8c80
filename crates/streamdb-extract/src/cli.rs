//! Command-line arguments.
//!
//! Every flag has an environment fallback (`STREAMDB_EXTRACT_*`). A JSON
//! configuration file given with `--config` is loaded first and the flags
//! override it.
//!
//! # Example
//!
//! ```no_run
//! use streamdb_extract::CliArgs;
//!
//! let args = CliArgs::from_args();
//! let config = args.into_config().expect("Invalid configuration");
//! println!("Extracting to {}", config.output_root.display());
//! ```

use crate::ExportResult;
use crate::config::ExportConfig;
use clap::Parser;
use std::path::PathBuf;
use streamdb_formats::AssetKind;

/// Extraction settings from CLI args and environment variables.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "streamdb-extract",
    about = "Extract images and models from .resources archives and .streamdb shards",
    version
)]
pub struct CliArgs {
    /// JSON configuration file, overridden by the flags below
    #[arg(long, env = "STREAMDB_EXTRACT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Primary .resources archive
    #[arg(long, env = "STREAMDB_EXTRACT_RESOURCES")]
    pub resources: Option<PathBuf>,

    /// JSON entry listing of the archive
    #[arg(long, env = "STREAMDB_EXTRACT_ENTRIES")]
    pub entries: Option<PathBuf>,

    /// Shard file, repeat in priority order
    #[arg(long = "shard", env = "STREAMDB_EXTRACT_SHARDS", value_delimiter = ',')]
    pub shards: Vec<PathBuf>,

    /// Directory searched for *.streamdb files
    #[arg(long, env = "STREAMDB_EXTRACT_SHARD_DIR")]
    pub shard_dir: Option<PathBuf>,

    /// Output root
    #[arg(short, long, env = "STREAMDB_EXTRACT_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Directory for matched.csv and unmatched.csv
    #[arg(long, env = "STREAMDB_EXTRACT_REPORT_DIR")]
    pub report_dir: Option<PathBuf>,

    /// Kinds to extract (image, animated_model, static_model)
    #[arg(long = "kind", env = "STREAMDB_EXTRACT_KINDS", value_delimiter = ',')]
    pub kinds: Vec<AssetKind>,

    /// JSON selection list
    #[arg(long, env = "STREAMDB_EXTRACT_SELECTION")]
    pub selection: Option<PathBuf>,
}

impl CliArgs {
    /// Parse arguments from the process command line.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Merge the flags onto the configuration file, or the defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration file cannot be loaded
    pub fn into_config(self) -> ExportResult<ExportConfig> {
        let mut config = match &self.config {
            Some(path) => ExportConfig::from_file(path)?,
            None => ExportConfig::default(),
        };

        if let Some(resources) = self.resources {
            config.resource_path = resources;
        }
        if let Some(entries) = self.entries {
            config.entry_listing = entries;
        }
        if !self.shards.is_empty() {
            config.shards = self.shards;
        }
        if let Some(dir) = self.shard_dir {
            config.shard_dir = Some(dir);
        }
        if let Some(output) = self.output {
            config.output_root = output;
        }
        if let Some(dir) = self.report_dir {
            config.report_dir = Some(dir);
        }
        if !self.kinds.is_empty() {
            config.kinds = self.kinds;
        }
        if let Some(selection) = self.selection {
            config.selection = Some(selection);
        }

        Ok(config)
    }
}
