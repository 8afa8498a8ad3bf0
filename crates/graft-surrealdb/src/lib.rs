//! # Graft SurrealDB Backend
//!
//! SurrealDB implementation of graft-core's [`GraphStore`](graft_core::GraphStore).
//!
//! ## Storage Layout
//!
//! - **Nodes**: `document`, `chunk` and `entity` tables, each record keyed by
//!   its id and repeating it in `node_id` under a unique index
//! - **Labels**: an accumulating `labels` array (`Chunk`, `Table`, `Entity`, ...)
//! - **Edges**: one `graph_edge` table, records keyed by both endpoints and the
//!   relation kind so re-ingestion never duplicates an edge
//! - **Vectors**: a cosine M-tree index over `chunk.embedding`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use graft_config::StoreConfig;
//! use graft_core::GraphStore;
//! use graft_surrealdb::SurrealGraphStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), graft_core::StoreError> {
//!     let store = SurrealGraphStore::connect(&StoreConfig::memory()).await?;
//!     store.verify_connectivity().await?;
//!
//!     let stats = store.graph_stats().await?;
//!     println!("{} chunks", stats.chunks);
//!     Ok(())
//! }
//! ```

mod client;
pub mod ddl;
mod error;
mod merge;
mod store;

pub use client::SurrealClient;
pub use merge::MergePlan;
pub use store::SurrealGraphStore;
