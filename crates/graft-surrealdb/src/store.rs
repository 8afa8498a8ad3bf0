//! [`GraphStore`] backed by SurrealDB

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use graft_config::{is_valid_identifier, StoreConfig};
use graft_core::{
    html_prefix, CanonicalUnit, ChunkSample, GraphStats, GraphStore, IndexState, MergeResult,
    NodeKind, StoreError, StoreResult, VectorIndexSpec,
};

use crate::client::SurrealClient;
use crate::ddl::{
    define_edge_table, define_node_table, define_unique_index, define_vector_index,
    info_for_index, info_for_table, unique_index_name, IndexInfo, TableInfo,
};
use crate::merge::MergePlan;

const STATS_QUERY: &str = "\
SELECT count() AS total FROM document GROUP ALL;
SELECT count() AS total FROM chunk GROUP ALL;
SELECT count() AS total FROM chunk WHERE labels CONTAINS 'Table' GROUP ALL;
SELECT count() AS total FROM chunk WHERE doc_id != NONE AND doc_id != NULL GROUP ALL;
SELECT count() AS total FROM entity GROUP ALL;
SELECT count() AS total FROM graph_edge GROUP ALL;
SELECT count() AS total FROM graph_edge WHERE kind = 'PART_OF' GROUP ALL;
SELECT node_id, summary, html_content FROM chunk WHERE labels CONTAINS 'Table' LIMIT 1;";

#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

#[derive(Debug, Deserialize)]
struct SampleRow {
    node_id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    html_content: Option<String>,
}

/// SurrealDB implementation of the graph store
#[derive(Debug, Clone)]
pub struct SurrealGraphStore {
    client: SurrealClient,
}

impl SurrealGraphStore {
    pub fn new(client: SurrealClient) -> Self {
        Self { client }
    }

    /// Connect with `config` and wrap the client
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        Ok(Self::new(SurrealClient::connect(config).await?))
    }

    pub fn client(&self) -> &SurrealClient {
        &self.client
    }

    /// Index definitions of `kind`'s table; empty when the table is not defined yet
    async fn table_info(&self, kind: NodeKind) -> StoreResult<TableInfo> {
        let mut response = match self.client.query(&info_for_table(kind), Value::Null).await {
            Ok(response) => response,
            Err(StoreError::Query(message)) if message.contains("does not exist") => {
                return Ok(TableInfo::default());
            }
            Err(err) => return Err(err),
        };
        let info: Option<TableInfo> = response
            .take(0)
            .map_err(|e| StoreError::Serialization(format!("INFO FOR TABLE {}: {}", kind.table(), e)))?;
        Ok(info.unwrap_or_default())
    }

    fn count(response: &mut surrealdb::Response, index: usize) -> StoreResult<u64> {
        let rows: Vec<CountRow> = response
            .take(index)
            .map_err(|e| StoreError::Serialization(format!("count statement {}: {}", index, e)))?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}

#[async_trait]
impl GraphStore for SurrealGraphStore {
    async fn verify_connectivity(&self) -> StoreResult<()> {
        self.client.health().await?;
        self.client.execute("RETURN true;", Value::Null).await
    }

    async fn ensure_unique_constraint(&self, kind: NodeKind) -> StoreResult<bool> {
        self.client
            .execute(&define_node_table(kind), Value::Null)
            .await?;

        let name = unique_index_name(kind);
        if self.table_info(kind).await?.indexes.contains_key(&name) {
            trace!("Index {} already present", name);
            return Ok(false);
        }

        self.client
            .execute(&define_unique_index(kind), Value::Null)
            .await
            .map_err(|e| StoreError::Schema(e.to_string()))?;

        // Edges are only created alongside entities, so define their table with them
        if kind == NodeKind::Entity {
            self.client.execute(&define_edge_table(), Value::Null).await?;
        }

        debug!("Defined {}", name);
        Ok(true)
    }

    async fn has_vector_index(&self, name: &str) -> StoreResult<bool> {
        Ok(self
            .table_info(NodeKind::Chunk)
            .await?
            .indexes
            .contains_key(name))
    }

    async fn create_vector_index(&self, spec: &VectorIndexSpec) -> StoreResult<()> {
        self.client
            .execute(&define_vector_index(spec), Value::Null)
            .await
            .map_err(|e| match e {
                StoreError::Connection(_) => e,
                other => StoreError::Schema(other.to_string()),
            })
    }

    async fn vector_index_state(&self, name: &str) -> StoreResult<IndexState> {
        if !is_valid_identifier(name) {
            return Err(StoreError::InvalidIdentifier(name.to_string()));
        }
        if !self.has_vector_index(name).await? {
            return Ok(IndexState::Missing);
        }

        let mut response = self.client.query(&info_for_index(name), Value::Null).await?;
        let info: Option<IndexInfo> = response
            .take(0)
            .map_err(|e| StoreError::Serialization(format!("INFO FOR INDEX {}: {}", name, e)))?;
        Ok(info.unwrap_or_default().state())
    }

    async fn apply_unit(&self, unit: &CanonicalUnit) -> StoreResult<MergeResult> {
        let plan = MergePlan::for_unit(unit);
        trace!(chunk_id = %unit.chunk.id, "Merge plan:\n{}", plan.sql);

        self.client.execute(&plan.sql, plan.params).await?;

        let result = MergeResult::for_unit(unit);
        debug!(
            chunk_id = %unit.chunk.id,
            entities = result.entities,
            mentions = result.mentions,
            relations = result.relations,
            "Merged chunk"
        );
        Ok(result)
    }

    async fn graph_stats(&self) -> StoreResult<GraphStats> {
        let mut response = self.client.query(STATS_QUERY, Value::Null).await?;

        let documents = Self::count(&mut response, 0)?;
        let chunks = Self::count(&mut response, 1)?;
        let table_chunks = Self::count(&mut response, 2)?;
        let chunks_with_document = Self::count(&mut response, 3)?;
        let entities = Self::count(&mut response, 4)?;
        let edges = Self::count(&mut response, 5)?;
        let part_of_edges = Self::count(&mut response, 6)?;

        let samples: Vec<SampleRow> = response
            .take(7)
            .map_err(|e| StoreError::Serialization(format!("sample table chunk: {}", e)))?;

        Ok(GraphStats {
            documents,
            chunks,
            table_chunks,
            chunks_with_document,
            entities,
            edges,
            part_of_edges,
            sample_table_chunk: samples.into_iter().next().map(|row| ChunkSample {
                id: row.node_id,
                summary: row.summary,
                html_prefix: row.html_content.as_deref().map(html_prefix),
            }),
        })
    }
}
