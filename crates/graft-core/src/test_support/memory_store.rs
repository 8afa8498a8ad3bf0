//! In-memory graph store
//!
//! Implements [`GraphStore`] with the same merge semantics as the SurrealDB
//! store so the loader and schema initializer can be tested without a
//! database. Each unit is applied to a copy of the graph that replaces the
//! live graph only when every step succeeded.
//!
//! Faults can be injected to exercise error paths:
//!
//! ```rust
//! use graft_core::test_support::InMemoryGraphStore;
//! use graft_core::StoreError;
//!
//! let store = InMemoryGraphStore::new();
//! store.fail_next_merges(1, StoreError::Transaction("conflict".into()));
//! store.fail_on_chunk("doc-1#3", StoreError::Query("constraint".into()));
//! ```

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use crate::error::{StoreError, StoreResult};
use crate::identifier::{Label, RelationKind};
use crate::store::{
    html_prefix, ChunkSample, GraphStats, GraphStore, IndexState, NodeKind, VectorIndexSpec,
};
use crate::unit::{CanonicalUnit, ChunkDescriptor, EdgeDescriptor, MergeResult};
use crate::value::PropertyMap;

/// Document or entity node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryNode {
    pub labels: BTreeSet<String>,
    pub properties: PropertyMap,
}

/// Chunk node with its last written properties
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryChunk {
    pub labels: BTreeSet<String>,
    pub chunk: ChunkDescriptor,
}

/// Edge identity: `(source, kind, target)`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemoryEdge {
    pub source: (NodeKind, String),
    pub kind: String,
    pub target: (NodeKind, String),
}

/// Snapshot of everything the store holds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryGraph {
    pub documents: BTreeMap<String, MemoryNode>,
    pub chunks: BTreeMap<String, MemoryChunk>,
    pub entities: BTreeMap<String, MemoryNode>,
    pub edges: BTreeSet<MemoryEdge>,
}

impl MemoryGraph {
    /// Targets of every `PART_OF` edge leaving `chunk_id`
    pub fn part_of_targets(&self, chunk_id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| {
                e.kind == RelationKind::PART_OF
                    && e.source.0 == NodeKind::Chunk
                    && e.source.1 == chunk_id
            })
            .map(|e| e.target.1.as_str())
            .collect()
    }

    /// Edges with an endpoint that does not exist
    pub fn dangling_edges(&self) -> Vec<&MemoryEdge> {
        self.edges
            .iter()
            .filter(|e| !self.contains(&e.source) || !self.contains(&e.target))
            .collect()
    }

    fn contains(&self, node: &(NodeKind, String)) -> bool {
        match node.0 {
            NodeKind::Document => self.documents.contains_key(&node.1),
            NodeKind::Chunk => self.chunks.contains_key(&node.1),
            NodeKind::Entity => self.entities.contains_key(&node.1),
        }
    }

    fn upsert_entity<'a>(
        &mut self,
        id: &str,
        labels: impl IntoIterator<Item = &'a Label>,
    ) -> &mut MemoryNode {
        let node = self.entities.entry(id.to_string()).or_default();
        node.labels.insert(Label::ENTITY.to_string());
        node.labels
            .extend(labels.into_iter().map(|l| l.as_str().to_string()));
        node
    }
}

#[derive(Default)]
struct Faults {
    unreachable: bool,
    next_merges: VecDeque<StoreError>,
    chunks: HashMap<String, StoreError>,
    entities: HashMap<String, StoreError>,
    index_states: VecDeque<StoreResult<IndexState>>,
}

#[derive(Default)]
struct State {
    graph: MemoryGraph,
    constraints: BTreeSet<NodeKind>,
    indexes: BTreeMap<String, VectorIndexSpec>,
    faults: Faults,
    apply_calls: usize,
    state_checks: usize,
}

/// [`GraphStore`] held entirely in memory
#[derive(Default)]
pub struct InMemoryGraphStore {
    state: Mutex<State>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation fails with a connection error while set
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().faults.unreachable = unreachable;
    }

    /// The next `count` merges fail with `error` before touching the graph
    pub fn fail_next_merges(&self, count: usize, error: StoreError) {
        let mut state = self.state.lock();
        for _ in 0..count {
            state.faults.next_merges.push_back(error.clone());
        }
    }

    /// Every merge of `chunk_id` fails with `error`
    pub fn fail_on_chunk(&self, chunk_id: &str, error: StoreError) {
        self.state
            .lock()
            .faults
            .chunks
            .insert(chunk_id.to_string(), error);
    }

    /// Fail a merge when it reaches `entity_id`, after earlier steps have run
    pub fn fail_on_entity(&self, entity_id: &str, error: StoreError) {
        self.state
            .lock()
            .faults
            .entities
            .insert(entity_id.to_string(), error);
    }

    /// Answers for the next index state checks; once drained the state is
    /// `Online` when the index exists and `Missing` otherwise
    pub fn script_index_states(&self, states: Vec<StoreResult<IndexState>>) {
        self.state.lock().faults.index_states.extend(states);
    }

    /// Pretend an index already exists
    pub fn add_vector_index(&self, spec: VectorIndexSpec) {
        self.state
            .lock()
            .indexes
            .insert(spec.name().to_string(), spec);
    }

    pub fn graph(&self) -> MemoryGraph {
        self.state.lock().graph.clone()
    }

    pub fn constraints(&self) -> BTreeSet<NodeKind> {
        self.state.lock().constraints.clone()
    }

    pub fn vector_indexes(&self) -> Vec<VectorIndexSpec> {
        self.state.lock().indexes.values().cloned().collect()
    }

    /// Number of `apply_unit` calls, including failed ones
    pub fn apply_calls(&self) -> usize {
        self.state.lock().apply_calls
    }

    /// Number of `vector_index_state` calls
    pub fn state_checks(&self) -> usize {
        self.state.lock().state_checks
    }

    fn check_reachable(state: &State) -> StoreResult<()> {
        if state.faults.unreachable {
            Err(StoreError::Connection("in-memory store set unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

fn apply(
    graph: &mut MemoryGraph,
    unit: &CanonicalUnit,
    dimension: Option<usize>,
    poisoned: &HashMap<String, StoreError>,
) -> StoreResult<()> {
    let doc = graph.documents.entry(unit.doc_id.clone()).or_default();
    doc.labels.insert(Label::DOCUMENT.to_string());

    let chunk = &unit.chunk;
    if let Some(dimension) = dimension {
        if chunk.has_embedding() && chunk.embedding.len() != dimension {
            return Err(StoreError::Query(format!(
                "Incorrect vector dimension ({}). Expected a vector of {} dimension.",
                chunk.embedding.len(),
                dimension
            )));
        }
    }

    let labels: BTreeSet<String> = chunk.labels().iter().map(|l| l.to_string()).collect();
    match graph.chunks.get_mut(&chunk.id) {
        Some(existing) => {
            existing.labels.extend(labels);
            existing.chunk = chunk.clone();
        }
        None => {
            graph.chunks.insert(
                chunk.id.clone(),
                MemoryChunk {
                    labels,
                    chunk: chunk.clone(),
                },
            );
        }
    }

    let chunk_ref = (NodeKind::Chunk, chunk.id.clone());
    graph.edges.retain(|e| {
        !(e.kind == RelationKind::PART_OF && e.source == chunk_ref && e.target.1 != unit.doc_id)
    });
    graph.edges.insert(MemoryEdge {
        source: chunk_ref.clone(),
        kind: RelationKind::PART_OF.to_string(),
        target: (NodeKind::Document, unit.doc_id.clone()),
    });

    for entity in &unit.entities {
        if let Some(err) = poisoned.get(&entity.id) {
            return Err(err.clone());
        }
        let node = graph.upsert_entity(&entity.id, &entity.labels);
        node.properties
            .extend(entity.properties.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    for edge in &unit.edges {
        for id in edge.entity_endpoints() {
            if let Some(err) = poisoned.get(id) {
                return Err(err.clone());
            }
            graph.upsert_entity(id, std::iter::empty::<&Label>());
        }
        let source = match edge {
            EdgeDescriptor::Mention { .. } => chunk_ref.clone(),
            EdgeDescriptor::Relation { source, .. } => (NodeKind::Entity, source.clone()),
        };
        graph.edges.insert(MemoryEdge {
            source,
            kind: edge.kind().to_string(),
            target: (NodeKind::Entity, edge.target().to_string()),
        });
    }

    Ok(())
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn verify_connectivity(&self) -> StoreResult<()> {
        Self::check_reachable(&self.state.lock())
    }

    async fn ensure_unique_constraint(&self, kind: NodeKind) -> StoreResult<bool> {
        let mut state = self.state.lock();
        Self::check_reachable(&state)?;
        Ok(state.constraints.insert(kind))
    }

    async fn has_vector_index(&self, name: &str) -> StoreResult<bool> {
        let state = self.state.lock();
        Self::check_reachable(&state)?;
        Ok(state.indexes.contains_key(name))
    }

    async fn create_vector_index(&self, spec: &VectorIndexSpec) -> StoreResult<()> {
        let mut state = self.state.lock();
        Self::check_reachable(&state)?;
        state
            .indexes
            .entry(spec.name().to_string())
            .or_insert_with(|| spec.clone());
        Ok(())
    }

    async fn vector_index_state(&self, name: &str) -> StoreResult<IndexState> {
        let mut state = self.state.lock();
        state.state_checks += 1;
        Self::check_reachable(&state)?;
        if let Some(scripted) = state.faults.index_states.pop_front() {
            return scripted;
        }
        Ok(if state.indexes.contains_key(name) {
            IndexState::Online
        } else {
            IndexState::Missing
        })
    }

    async fn apply_unit(&self, unit: &CanonicalUnit) -> StoreResult<MergeResult> {
        let mut state = self.state.lock();
        state.apply_calls += 1;
        Self::check_reachable(&state)?;

        if let Some(err) = state.faults.next_merges.pop_front() {
            return Err(err);
        }
        if let Some(err) = state.faults.chunks.get(&unit.chunk.id) {
            return Err(err.clone());
        }

        // One index over chunk embeddings, as in the real store
        let dimension = state.indexes.values().next().map(VectorIndexSpec::dimension);

        let mut working = state.graph.clone();
        apply(&mut working, unit, dimension, &state.faults.entities)?;
        state.graph = working;

        Ok(MergeResult::for_unit(unit))
    }

    async fn graph_stats(&self) -> StoreResult<GraphStats> {
        let state = self.state.lock();
        Self::check_reachable(&state)?;
        let graph = &state.graph;

        let tables: Vec<&MemoryChunk> = graph
            .chunks
            .values()
            .filter(|c| c.labels.contains(Label::TABLE))
            .collect();

        Ok(GraphStats {
            documents: graph.documents.len() as u64,
            chunks: graph.chunks.len() as u64,
            table_chunks: tables.len() as u64,
            chunks_with_document: graph
                .chunks
                .values()
                .filter(|c| !c.chunk.doc_id.is_empty())
                .count() as u64,
            entities: graph.entities.len() as u64,
            edges: graph.edges.len() as u64,
            part_of_edges: graph
                .edges
                .iter()
                .filter(|e| e.kind == RelationKind::PART_OF)
                .count() as u64,
            sample_table_chunk: tables.first().map(|c| ChunkSample {
                id: c.chunk.id.clone(),
                summary: c.chunk.summary.clone(),
                html_prefix: c.chunk.html_content.as_deref().map(html_prefix),
            }),
        })
    }
}
