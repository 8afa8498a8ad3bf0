//! Effective configuration for a run
//!
//! Command-line flags are the last layer on top of what
//! [`ConfigLoader`] assembles from defaults, the TOML file and `GRAFT_*`
//! variables.

use anyhow::{Context, Result};

use graft_config::{ConfigLoader, GraftConfig};

use crate::cli::{Cli, LoadArgs};

pub fn load(cli: &Cli) -> Result<GraftConfig> {
    let config = ConfigLoader::new()
        .load(cli.config.as_deref())
        .context("Failed to load configuration")?;
    apply_overrides(config, cli)
}

/// Apply the global store flags and re-validate
pub fn apply_overrides(mut config: GraftConfig, cli: &Cli) -> Result<GraftConfig> {
    if let Some(store) = &cli.store {
        config.store.address = store.clone();
    }
    if let Some(namespace) = &cli.namespace {
        config.store.namespace = namespace.clone();
    }
    if let Some(database) = &cli.database {
        config.store.database = database.clone();
    }
    if let (Some(username), Some(password)) = (&cli.username, &cli.password) {
        config.store.username = Some(username.clone());
        config.store.password = Some(password.clone());
    }

    config
        .validate()
        .context("Invalid configuration after applying command-line flags")?;
    Ok(config)
}

/// Apply `load` flags to the input section
pub fn apply_load_args(config: &mut GraftConfig, args: &LoadArgs) {
    if let Some(directory) = &args.directory {
        config.input.directory = directory.clone();
    }
    if args.recursive {
        config.input.recursive = true;
    }
    if let Some(extension) = &args.extension {
        config.input.extension = extension.trim_start_matches('.').to_string();
    }
}
