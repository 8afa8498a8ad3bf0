//! Factory functions for creating infrastructure implementations
//!
//! This module is the composition root: the SurrealDB store is built here and
//! handed to the rest of the CLI as a `GraphStore` trait object.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use graft_config::{GraftConfig, StoreConfig};
use graft_core::{GraphStore, SchemaInitializer, SchemaReport};
use graft_pipeline::{BatchLoader, LoadObserver};
use graft_surrealdb::SurrealGraphStore;

use crate::output;

/// Connect to the configured store and check it answers
pub async fn create_store(config: &StoreConfig) -> Result<Arc<dyn GraphStore>> {
    if config.is_memory() {
        output::warning(&format!(
            "{} is an in-memory store; nothing is kept after graft exits",
            config.address
        ));
    }

    let store = SurrealGraphStore::connect(config)
        .await
        .with_context(|| format!("Failed to connect to graph store at {}", config.address))?;

    store
        .verify_connectivity()
        .await
        .with_context(|| format!("Graph store at {} is unreachable", config.address))?;

    Ok(Arc::new(store))
}

/// Ensure constraints and the vector index
pub async fn initialize_schema(store: &dyn GraphStore, config: &GraftConfig) -> Result<SchemaReport> {
    let report = SchemaInitializer::new(config.schema.clone())
        .ensure_schema(store)
        .await
        .context("Schema initialization failed")?;
    info!(
        "Schema ready: {} constraint(s) created, index {} {}",
        report.constraints_created.len(),
        report.index_name,
        if report.index_created { "created" } else { "present" }
    );
    Ok(report)
}

/// Loader for `store`, or a dry-run loader when `store` is `None`
pub fn create_loader(
    store: Option<Arc<dyn GraphStore>>,
    config: &GraftConfig,
    observer: Arc<dyn LoadObserver>,
) -> BatchLoader {
    let loader = match store {
        Some(store) => BatchLoader::new(store, config),
        None => BatchLoader::dry_run(config),
    };
    loader.with_observer(observer)
}
