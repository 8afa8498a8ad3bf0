//! # Graft Pipeline
//!
//! Batch loading of chunk records into a graph store.
//!
//! ## Pipeline Architecture
//!
//! 1. **Discover**: find `.jsonl` files in the input directory ([`InputDiscovery`])
//! 2. **Stream**: read each source line by line ([`InputSource`])
//! 3. **Normalize**: turn each record into a canonical unit (`graft_core::RecordNormalizer`)
//! 4. **Merge**: apply each unit as one transaction (`graft_core::GraphStore`)
//!
//! The [`BatchLoader`] only coordinates and keeps the books; normalization and
//! merge semantics live in `graft-core` and the store crates.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use graft_config::GraftConfig;
//! use graft_core::GraphStore;
//! use graft_pipeline::{BatchLoader, InputSource};
//!
//! # async fn example(store: Arc<dyn GraphStore>) -> Result<(), graft_pipeline::LoadError> {
//! let config = GraftConfig::default();
//! let loader = BatchLoader::new(store, &config);
//! let report = loader
//!     .load(&[InputSource::file("graph_rag_files/report.jsonl")])
//!     .await?;
//! println!("{} merged, {} failed", report.total_succeeded(), report.total_failed());
//! # Ok(())
//! # }
//! ```

mod discovery;
mod error;
mod loader;
mod observer;
mod report;
mod retry;
mod source;

pub use discovery::InputDiscovery;
pub use error::LoadError;
pub use loader::BatchLoader;
pub use observer::{LoadObserver, NoopObserver, RecordEvent};
pub use report::{FailureKind, LoadReport, RecordFailure, SourceReport};
pub use retry::RetryPolicy;
pub use source::InputSource;
