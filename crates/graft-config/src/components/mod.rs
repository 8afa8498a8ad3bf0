//! Per-component configuration sections

pub mod ingest;
pub mod logging;
pub mod schema;
pub mod store;

pub use ingest::{InputConfig, LoaderConfig, MergeConfig, NormalizeConfig};
pub use logging::LoggingConfig;
pub use schema::SchemaConfig;
pub use store::{StoreConfig, DEFAULT_ADDRESS, MEMORY_ADDRESS};
