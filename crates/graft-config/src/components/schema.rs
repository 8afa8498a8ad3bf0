//! Schema initialization configuration

use serde::{Deserialize, Serialize};

/// Vector index and polling settings used by the schema initializer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SchemaConfig {
    /// Length of every chunk embedding
    pub vector_dimension: usize,
    /// Name of the cosine vector index over chunk embeddings
    pub vector_index_name: String,
    /// Delay between index status checks
    pub index_poll_interval_ms: u64,
    /// Status checks before giving up on the index
    pub index_poll_attempts: u32,
    /// Build the index in the background and wait for it
    pub concurrent_index_build: bool,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            vector_dimension: 384,
            vector_index_name: "chunk_embedding_index".to_string(),
            index_poll_interval_ms: 1000,
            index_poll_attempts: 60,
            concurrent_index_build: false,
        }
    }
}
