use anyhow::Result;
use clap::Parser;
use tracing::debug;

use graft_cli::{
    cli::{Cli, Commands},
    commands, config, logging,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration with CLI overrides
    let config = config::load(&cli)?;

    logging::init(cli.log_level, cli.verbose, &config.logging.level)?;
    debug!("Effective configuration: {:?}", config);

    match cli.command {
        Commands::Load(args) => commands::load::execute(config, args).await?,
        Commands::Schema => commands::schema::execute(config).await?,
        Commands::Verify => commands::verify::execute(config).await?,
    }

    Ok(())
}
