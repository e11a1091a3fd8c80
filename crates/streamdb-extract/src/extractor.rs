//! Run orchestration across asset kinds

use crate::ExportResult;
use crate::assembler::{Assembler, BatchCounters};
use crate::config::ExportConfig;
use crate::export_list::ExportList;
use crate::filter::Selection;
use crate::preflight::{SpaceProbe, check_free_space};
use crate::report::{CsvReport, NullReport, ReportSink, write_reports};
use crate::source::{ResourceFile, ResourceSource, ShardSource, open_shards};
use serde::Serialize;
use std::path::{Path, PathBuf};
use streamdb_formats::{AssetKind, Decompressor, StreamDbFile};
use tracing::info;

/// Counters of every batch of a run, in run order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Per-kind counters
    pub batches: Vec<(AssetKind, BatchCounters)>,
}

impl RunSummary {
    /// Counters of one kind
    pub fn get(&self, kind: AssetKind) -> Option<BatchCounters> {
        self.batches
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, counters)| *counters)
    }

    /// Sum over all kinds
    pub fn total(&self) -> BatchCounters {
        self.batches
            .iter()
            .fold(BatchCounters::default(), |total, (_, counters)| total + *counters)
    }
}

/// Extracts assets of the requested kinds from one archive and its shards
pub struct Extractor<R, S, D> {
    resource: R,
    shards: Vec<S>,
    codec: D,
    output_root: PathBuf,
    kinds: Vec<AssetKind>,
    selection: Option<Selection>,
}

impl<D: Decompressor> Extractor<ResourceFile, StreamDbFile, D> {
    /// Open the archive listing and every shard named by `config`
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or a source cannot be
    /// opened
    pub fn from_config(config: &ExportConfig, codec: D) -> ExportResult<Self> {
        config.validate()?;

        let resource = ResourceFile::with_listing(&config.resource_path, &config.entry_listing)?;
        let shards = open_shards(&config.shard_paths()?)?;
        let extractor = Self::new(resource, shards, codec, &config.output_root)
            .with_kinds(config.kinds.clone());

        Ok(match config.load_selection()? {
            Some(selection) => extractor.with_selection(selection),
            None => extractor,
        })
    }
}

impl<R, S, D> Extractor<R, S, D>
where
    R: ResourceSource,
    S: ShardSource,
    D: Decompressor,
{
    /// Create an extractor for every kind with no selection
    pub fn new(resource: R, shards: Vec<S>, codec: D, output_root: impl AsRef<Path>) -> Self {
        Self {
            resource,
            shards,
            codec,
            output_root: output_root.as_ref().to_path_buf(),
            kinds: AssetKind::ALL.to_vec(),
            selection: None,
        }
    }

    /// Set the kinds to extract, in order
    #[must_use]
    pub fn with_kinds(mut self, kinds: Vec<AssetKind>) -> Self {
        self.kinds = kinds;
        self
    }

    /// Restrict extraction to a selection list
    #[must_use]
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Build the export list of every requested kind
    pub fn build_lists(&self) -> Vec<ExportList> {
        self.kinds
            .iter()
            .map(|&kind| {
                ExportList::build(
                    kind,
                    &self.resource,
                    &self.shards,
                    &self.codec,
                    self.selection.as_ref(),
                )
            })
            .collect()
    }

    /// Resolve, report, check free space, then write every kind.
    ///
    /// Nothing is written under the output root when the free-space check
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns error if reports cannot be written or the destination lacks
    /// space
    pub fn run<P, K>(&self, probe: &P, reports: &K) -> ExportResult<RunSummary>
    where
        P: SpaceProbe + ?Sized,
        K: ReportSink + ?Sized,
    {
        let lists = self.build_lists();

        for list in &lists {
            write_reports(list, reports)?;
        }
        reports.finish()?;

        check_free_space(&lists, &self.output_root, probe)?;

        let assembler = Assembler::new(&self.output_root, &self.codec);
        let batches = lists
            .iter()
            .map(|list| (list.kind(), assembler.export(list, &self.shards)))
            .collect();
        let summary = RunSummary { batches };

        let total = summary.total();
        info!(
            "Export finished: {} written, {} not found, {} errors",
            total.written, total.not_found, total.errors
        );
        Ok(summary)
    }
}

/// Report sink for `config`: CSV files when a report directory is set
///
/// # Errors
///
/// Returns error if the report files cannot be created
pub fn open_reports(config: &ExportConfig) -> ExportResult<Box<dyn ReportSink>> {
    Ok(match &config.report_dir {
        Some(dir) => Box::new(CsvReport::create(dir)?),
        None => Box::new(NullReport),
    })
}
