//! Graph store abstraction
//!
//! The ingestion components only talk to the store through [`GraphStore`].
//! The SurrealDB implementation lives in `graft-surrealdb`; an in-memory one
//! with the same merge semantics lives in [`crate::test_support`].
//!
//! ## Merge contract
//!
//! [`GraphStore::apply_unit`] applies one [`CanonicalUnit`] atomically:
//!
//! 1. Upsert the document node by id.
//! 2. Upsert the chunk node, overwrite its properties, attach `Chunk` (and
//!    `Table` for tabular chunks), and make the chunk's only `PART_OF` edge
//!    point at its document.
//! 3. Upsert each entity by canonical id, union its tags with `Entity` and
//!    the descriptor's labels, merge properties per key (newest wins).
//! 4. Upsert each edge, creating missing entity endpoints first. An edge is
//!    identified by `(source, kind, target)` so it is never duplicated.
//!
//! Any failure rolls back the whole unit. Implementations never retry.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use crate::error::{StoreError, StoreResult};
use crate::identifier::Label;
use crate::unit::{CanonicalUnit, MergeResult};
use graft_config::is_valid_identifier;

/// Node kinds with an identity constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum NodeKind {
    Document,
    Chunk,
    Entity,
}

impl NodeKind {
    pub const ALL: [NodeKind; 3] = [NodeKind::Document, NodeKind::Chunk, NodeKind::Entity];

    /// Table holding nodes of this kind
    pub fn table(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Chunk => "chunk",
            Self::Entity => "entity",
        }
    }

    /// Fixed tag carried by every node of this kind
    pub fn label(self) -> &'static str {
        match self {
            Self::Document => Label::DOCUMENT,
            Self::Chunk => Label::CHUNK,
            Self::Entity => Label::ENTITY,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Vector index over chunk embeddings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorIndexSpec {
    name: String,
    dimension: usize,
    concurrent: bool,
}

impl VectorIndexSpec {
    /// The name is interpolated into DDL, so it must be a plain identifier
    pub fn new(name: impl Into<String>, dimension: usize, concurrent: bool) -> StoreResult<Self> {
        let name = name.into();
        if !is_valid_identifier(&name) {
            return Err(StoreError::InvalidIdentifier(name));
        }
        if dimension == 0 {
            return Err(StoreError::Schema(
                "vector index dimension must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            name,
            dimension,
            concurrent,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Build in the background instead of inside the defining statement
    pub fn concurrent(&self) -> bool {
        self.concurrent
    }
}

/// Build state of a vector index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexState {
    Online,
    Populating(String),
    Failed(String),
    Missing,
}

impl fmt::Display for IndexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Populating(detail) => write!(f, "populating ({})", detail),
            Self::Failed(detail) => write!(f, "failed ({})", detail),
            Self::Missing => write!(f, "missing"),
        }
    }
}

/// A table chunk shown by `graft verify`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChunkSample {
    pub id: String,
    pub summary: Option<String>,
    pub html_prefix: Option<String>,
}

/// Node and edge counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub documents: u64,
    pub chunks: u64,
    pub table_chunks: u64,
    pub chunks_with_document: u64,
    pub entities: u64,
    pub edges: u64,
    pub part_of_edges: u64,
    pub sample_table_chunk: Option<ChunkSample>,
}

/// Number of characters of HTML shown in a [`ChunkSample`]
pub const HTML_PREFIX_CHARS: usize = 50;

/// Truncate to the sample prefix length on a character boundary
pub fn html_prefix(html: &str) -> String {
    html.chars().take(HTML_PREFIX_CHARS).collect()
}

/// Storage operations the ingestion components need
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Round-trip to the store; fails with [`StoreError::Connection`] when unreachable
    async fn verify_connectivity(&self) -> StoreResult<()>;

    /// Ensure ids of `kind` are unique. Returns true when the constraint was created.
    async fn ensure_unique_constraint(&self, kind: NodeKind) -> StoreResult<bool>;

    async fn has_vector_index(&self, name: &str) -> StoreResult<bool>;

    async fn create_vector_index(&self, spec: &VectorIndexSpec) -> StoreResult<()>;

    /// Current build state, [`IndexState::Missing`] when no such index exists
    async fn vector_index_state(&self, name: &str) -> StoreResult<IndexState>;

    /// Apply one unit as a single transaction (see the module docs)
    async fn apply_unit(&self, unit: &CanonicalUnit) -> StoreResult<MergeResult>;

    async fn graph_stats(&self) -> StoreResult<GraphStats>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_spec_rejects_injection() {
        assert!(VectorIndexSpec::new("chunk_embedding_index", 384, false).is_ok());
        assert!(matches!(
            VectorIndexSpec::new("idx ON TABLE x; REMOVE TABLE chunk", 384, false),
            Err(StoreError::InvalidIdentifier(_))
        ));
        assert!(VectorIndexSpec::new("idx", 0, false).is_err());
    }

    #[test]
    fn html_prefix_respects_char_boundaries() {
        let html = "é".repeat(80);
        assert_eq!(html_prefix(&html).chars().count(), HTML_PREFIX_CHARS);
        assert_eq!(html_prefix("<td>"), "<td>");
    }
}
