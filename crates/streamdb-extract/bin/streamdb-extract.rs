//! streamdb-extract binary entry point.
//!
//! A thin wrapper around the streamdb-extract library that:
//! 1. Initializes logging
//! 2. Builds the configuration from CLI args, environment and config file
//! 3. Runs the extraction with the zlib codec
//!
//! For library usage, see the streamdb-extract crate documentation.

use anyhow::{Context, Result};
use streamdb_extract::{CliArgs, Extractor, SystemSpace, open_reports};
use streamdb_formats::ZlibCodec;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = CliArgs::from_args()
        .into_config()
        .context("Failed to load configuration")?;

    tracing::info!(
        "Configuration loaded: resources={}, output={}, kinds={:?}",
        config.resource_path.display(),
        config.output_root.display(),
        config.kinds
    );

    let extractor = Extractor::from_config(&config, ZlibCodec)?;
    let reports = open_reports(&config)?;
    let summary = extractor.run(&SystemSpace, reports.as_ref())?;

    for (kind, counters) in &summary.batches {
        tracing::info!(
            "{kind}: {} written, {} not found, {} errors",
            counters.written,
            counters.not_found,
            counters.errors
        );
    }

    Ok(())
}
