use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages (default)
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl LogLevel {
    /// Lower-case name as used in filter directives
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser)]
#[command(name = "graft")]
#[command(about = "graft - load pre-embedded document chunks into a knowledge graph")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, uses RUST_LOG, then the config file value
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults to ./graft.toml, then ~/.config/graft/config.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Graph store address: mem://, rocksdb://<path> or ws://host:port
    #[arg(long, global = true)]
    pub store: Option<String>,

    /// Store namespace (overrides config file)
    #[arg(long, global = true)]
    pub namespace: Option<String>,

    /// Store database (overrides config file)
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Root user for the store
    #[arg(long, global = true, requires = "password")]
    pub username: Option<String>,

    /// Root password for the store
    #[arg(long, global = true, requires = "username")]
    pub password: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ensure the schema, then load every record file in a directory
    Load(LoadArgs),

    /// Create uniqueness constraints and the vector index, then exit
    Schema,

    /// Print graph statistics and a sample table chunk
    Verify,
}

#[derive(Debug, Clone, Args)]
pub struct LoadArgs {
    /// Directory holding the record files (defaults to input.directory from config)
    pub directory: Option<PathBuf>,

    /// Also load files in subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Record file extension (defaults to input.extension from config)
    #[arg(long = "ext", value_name = "EXT")]
    pub extension: Option<String>,

    /// Normalize and check every record without touching the store
    #[arg(long)]
    pub dry_run: bool,
}
