//! Load Command - Schema, Discovery and Batch Loading
//!
//! ```text
//! connect -> verify connectivity -> ensure schema -> discover files -> load -> summary
//! ```
//!
//! Per-record failures end up in the summary and do not fail the command;
//! an unreachable store or a schema failure does.

use anyhow::{anyhow, Result};
use std::sync::Arc;
use tracing::info;

use graft_config::GraftConfig;
use graft_pipeline::{InputDiscovery, InputSource, LoadError};

use crate::cli::LoadArgs;
use crate::config::apply_load_args;
use crate::progress::LoadProgress;
use crate::{factories, output};

pub async fn execute(mut config: GraftConfig, args: LoadArgs) -> Result<()> {
    apply_load_args(&mut config, &args);
    let input = &config.input;

    info!("Loading from {}", input.directory.display());
    info!("Recursive: {}", input.recursive);
    info!("Dry-run mode: {}", args.dry_run);

    let store = if args.dry_run {
        output::info("Dry run: records are checked but not written");
        None
    } else {
        output::info(&format!("Connecting to {}...", config.store.address));
        let store = factories::create_store(&config.store).await?;
        let report = factories::initialize_schema(store.as_ref(), &config).await?;
        output::success(&format!(
            "Schema ready (vector index {} online)",
            report.index_name
        ));
        Some(store)
    };

    let files = InputDiscovery::from_config(input).discover(&input.directory);
    if files.is_empty() {
        output::warning(&format!(
            "No .{} files found in {}",
            input.extension.trim_start_matches('.'),
            input.directory.display()
        ));
        return Ok(());
    }
    output::info(&format!("Found {} file(s) to load", files.len()));

    let sources: Vec<InputSource> = files.into_iter().map(InputSource::from).collect();
    let progress = Arc::new(LoadProgress::new(sources.len()));
    let loader = factories::create_loader(store, &config, progress.clone());

    let result = loader.load(&sources).await;
    progress.finish();

    match result {
        Ok(report) => {
            output::print_load_report(&report);
            Ok(())
        }
        Err(err @ LoadError::Connection { .. }) => {
            output::print_load_report(err.report());
            Err(anyhow!(err).context("Load aborted; records above were committed"))
        }
    }
}
