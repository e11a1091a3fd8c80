//! Asset extraction from `.resources` archives and `.streamdb` shards
//!
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
//! Each requested [`AssetKind`] runs through the same pipeline:
//!
//! 1. **Filter**: archive entries of the kind become [`Candidate`]s
//! 2. **Header**: the embedded header gives the real payload sizes
//! 3. **Key**: content hash and mip count give the [`ShardKey`]
//! 4. **Locate**: the key is resolved to a shard and offset
//! 5. **Assemble**: the payload is read, inflated and written
//!
//! Stages 1 to 4 build an [`ExportList`] per kind. The [`Extractor`] writes
//! the reports, checks free space for every list, and only then writes
//! files.
//!
//! # Example
//!
//! ```no_run
//! use streamdb_extract::{ExportConfig, Extractor, NullReport, SystemSpace};
//! use streamdb_formats::ZlibCodec;
//!
//! # fn main() -> streamdb_extract::ExportResult<()> {
//! let config = ExportConfig::new("gameresources.resources", "gameresources.json")
//!     .with_shard_dir("base")
//!     .with_output_root("exported");
//! let extractor = Extractor::from_config(&config, ZlibCodec)?;
//! let summary = extractor.run(&SystemSpace, &NullReport)?;
//! println!("{} files written", summary.total().written);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod assembler;
pub mod candidate;
pub mod cli;
pub mod config;
pub mod error;
pub mod export_list;
pub mod extractor;
pub mod filter;
pub mod header;
pub mod locator;
pub mod preflight;
pub mod report;
pub mod source;

pub use assembler::{Assembler, BatchCounters, output_path};
pub use candidate::{Candidate, LookupPass, ShardLocation};
pub use cli::CliArgs;
pub use config::ExportConfig;
pub use error::{CandidateError, ExportError, ExportResult};
pub use export_list::ExportList;
pub use extractor::{Extractor, RunSummary, open_reports};
pub use filter::{Selection, select_candidates};
pub use header::decode_header;
pub use locator::locate;
pub use preflight::{FixedSpace, SpaceProbe, SystemSpace, check_free_space, required_space};
pub use report::{CsvReport, MemoryReport, NullReport, ReportRow, ReportSink, write_reports};
pub use source::{ResourceFile, ResourceSource, ShardSource, open_shards};

pub use streamdb_formats::{AssetKind, ShardKey};
