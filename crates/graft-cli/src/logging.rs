//! Tracing subscriber setup
//!
//! Logs go to stderr so the summary on stdout stays clean. The graft crates
//! log at the chosen level; everything else (SurrealDB, RocksDB) at `warn`.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

const GRAFT_TARGETS: &[&str] = &[
    "graft",
    "graft_cli",
    "graft_config",
    "graft_core",
    "graft_pipeline",
    "graft_surrealdb",
];

/// Filter directives for `level`, e.g. `warn,graft_core=debug,...`
pub fn directives(level: &str) -> String {
    let level = level.trim().to_ascii_lowercase();
    if level == "off" {
        return level;
    }
    let mut directives = String::from("warn");
    for target in GRAFT_TARGETS {
        directives.push_str(&format!(",{}={}", target, level));
    }
    directives
}

/// Choose the filter: `--log-level`/`--verbose`, then `RUST_LOG`, then the
/// configured level
pub fn filter(cli_level: Option<LogLevel>, verbose: bool, config_level: &str) -> EnvFilter {
    let explicit = cli_level.or(verbose.then_some(LogLevel::Debug));
    if let Some(level) = explicit {
        return EnvFilter::new(directives(level.as_str()));
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(config_level)))
}

pub fn init(cli_level: Option<LogLevel>, verbose: bool, config_level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(cli_level, verbose, config_level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
