//! SurrealQL schema statements
//!
//! Only fixed table names and a validated index name are interpolated; record
//! data never reaches these strings.

use serde::Deserialize;
use std::collections::BTreeMap;

use graft_core::{IndexState, NodeKind, VectorIndexSpec};

/// Table holding every edge, keyed by `[source_table, source_id, kind, target_table, target_id]`
pub const EDGE_TABLE: &str = "graph_edge";

/// Field repeating a node's identity under a unique index
pub const IDENTITY_FIELD: &str = "node_id";

pub fn unique_index_name(kind: NodeKind) -> String {
    format!("{}_{}_unique", kind.table(), IDENTITY_FIELD)
}

pub fn define_node_table(kind: NodeKind) -> String {
    format!("DEFINE TABLE IF NOT EXISTS {} SCHEMALESS;", kind.table())
}

pub fn define_edge_table() -> String {
    format!(
        "DEFINE TABLE IF NOT EXISTS {table} SCHEMALESS;\n\
         DEFINE INDEX IF NOT EXISTS {table}_kind ON TABLE {table} FIELDS kind;",
        table = EDGE_TABLE
    )
}

pub fn define_unique_index(kind: NodeKind) -> String {
    format!(
        "DEFINE INDEX IF NOT EXISTS {} ON TABLE {} FIELDS {} UNIQUE;",
        unique_index_name(kind),
        kind.table(),
        IDENTITY_FIELD
    )
}

/// Cosine M-tree index over chunk embeddings
pub fn define_vector_index(spec: &VectorIndexSpec) -> String {
    format!(
        "DEFINE INDEX IF NOT EXISTS {} ON TABLE {} FIELDS embedding MTREE DIMENSION {} DIST COSINE{};",
        spec.name(),
        NodeKind::Chunk.table(),
        spec.dimension(),
        if spec.concurrent() { " CONCURRENTLY" } else { "" }
    )
}

pub fn info_for_table(kind: NodeKind) -> String {
    format!("INFO FOR TABLE {};", kind.table())
}

/// Caller guarantees `name` came from a [`VectorIndexSpec`] or passed the
/// same identifier check
pub fn info_for_index(name: &str) -> String {
    format!(
        "INFO FOR INDEX {} ON TABLE {};",
        name,
        NodeKind::Chunk.table()
    )
}

/// The parts of `INFO FOR TABLE` graft reads
#[derive(Debug, Default, Deserialize)]
pub struct TableInfo {
    #[serde(default)]
    pub indexes: BTreeMap<String, String>,
}

/// The parts of `INFO FOR INDEX` graft reads
#[derive(Debug, Default, Deserialize)]
pub struct IndexInfo {
    #[serde(default)]
    pub building: Option<BuildingInfo>,
}

/// Background build progress, present for indexes defined `CONCURRENTLY`
#[derive(Debug, Default, Deserialize)]
pub struct BuildingInfo {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl IndexInfo {
    /// An index without build information was built inline and is usable
    pub fn state(&self) -> IndexState {
        let Some(building) = &self.building else {
            return IndexState::Online;
        };
        match building.status.as_str() {
            "ready" | "" => IndexState::Online,
            "error" | "aborted" => IndexState::Failed(
                building
                    .error
                    .clone()
                    .unwrap_or_else(|| building.status.clone()),
            ),
            status => IndexState::Populating(match building.count {
                Some(count) => format!("{}, {} records", status, count),
                None => status.to_string(),
            }),
        }
    }
}
