//! # Graft Configuration Library
//!
//! Type-safe configuration for the graft ingestion pipeline. Every component
//! receives its section of [`GraftConfig`] at construction instead of reading
//! process-wide globals.
//!
//! ## Sources
//!
//! Values are layered in increasing priority:
//!
//! 1. Built-in defaults (an empty file is a valid configuration)
//! 2. A TOML file (`--config`, `./graft.toml`, or `~/.config/graft/config.toml`)
//! 3. `GRAFT_*` environment variables
//! 4. Command-line flags, applied by the CLI after loading
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use graft_config::ConfigLoader;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().load(None)?;
//!     println!("vector index: {}", config.schema.vector_index_name);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod components;
mod config;
mod error;
mod loader;
mod validation;

pub use components::*;
pub use config::GraftConfig;
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, ENV_PREFIX};
pub use validation::is_valid_identifier;
