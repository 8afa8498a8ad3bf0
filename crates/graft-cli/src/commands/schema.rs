//! Schema Command - constraints and vector index only

use anyhow::Result;
use tracing::info;

use graft_config::GraftConfig;

use crate::{factories, output};

pub async fn execute(config: GraftConfig) -> Result<()> {
    info!("Starting schema command");

    output::info(&format!("Connecting to {}...", config.store.address));
    let store = factories::create_store(&config.store).await?;

    let report = factories::initialize_schema(store.as_ref(), &config).await?;
    output::print_schema_report(&report);
    Ok(())
}
