//! Verify Command - graph statistics after a load

use anyhow::{Context, Result};

use graft_config::GraftConfig;

use crate::{factories, output};

pub async fn execute(config: GraftConfig) -> Result<()> {
    let store = factories::create_store(&config.store).await?;
    output::success(&format!("Connected to {}", config.store.address));

    let stats = store
        .graph_stats()
        .await
        .context("Failed to read graph statistics")?;
    output::print_stats(&stats);
    Ok(())
}
