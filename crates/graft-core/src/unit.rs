//! Canonical ingestion units
//!
//! A [`CanonicalUnit`] is the store-agnostic form of one input record: the
//! owning document, one chunk, the entities it mentions and the typed edges
//! between them. The merge engine applies a unit as a single transaction.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::identifier::{Label, RelationKind};
use crate::value::PropertyMap;

/// Chunk content type
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContentType {
    #[default]
    Text,
    Table,
    /// Any other value the chunker produced, stored verbatim
    Other(String),
}

impl ContentType {
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "text" => Self::Text,
            "table" => Self::Table,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Table => "table",
            Self::Other(other) => other,
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self, Self::Table)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ContentType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Properties written to a chunk node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkDescriptor {
    pub id: String,
    pub doc_id: String,
    pub text: String,
    /// Empty when the record carried no usable embedding
    pub embedding: Vec<f32>,
    pub page_number: Option<i64>,
    pub content_type: ContentType,
    pub summary: Option<String>,
    pub html_content: Option<String>,
    pub markdown_content: Option<String>,
}

impl ChunkDescriptor {
    /// Tags for the chunk node: `Chunk`, plus `Table` for tabular content
    pub fn labels(&self) -> Vec<Label> {
        let mut labels = vec![Label::fixed(Label::CHUNK)];
        if self.content_type.is_table() {
            labels.push(Label::fixed(Label::TABLE));
        }
        labels
    }

    pub fn has_embedding(&self) -> bool {
        !self.embedding.is_empty()
    }
}

/// One entity mentioned by a record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityDescriptor {
    /// Canonical id, see [`crate::normalize_id`]
    pub id: String,
    /// Semantic tags; the fixed `Entity` tag is added by the store
    pub labels: BTreeSet<Label>,
    pub properties: PropertyMap,
}

impl EntityDescriptor {
    /// Fold a later entry for the same id into this one
    pub fn absorb(&mut self, other: EntityDescriptor) {
        self.labels.extend(other.labels);
        self.properties.extend(other.properties);
    }
}

/// A typed edge produced from `extracted_edges`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum EdgeDescriptor {
    /// Chunk -> Entity provenance edge; the source is the unit's chunk
    Mention { target: String, kind: RelationKind },
    /// Entity -> Entity semantic edge
    Relation {
        source: String,
        target: String,
        kind: RelationKind,
    },
}

impl EdgeDescriptor {
    pub fn kind(&self) -> &RelationKind {
        match self {
            Self::Mention { kind, .. } | Self::Relation { kind, .. } => kind,
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Self::Mention { target, .. } | Self::Relation { target, .. } => target,
        }
    }

    /// Entity ids this edge needs to exist
    pub fn entity_endpoints(&self) -> Vec<&str> {
        match self {
            Self::Mention { target, .. } => vec![target.as_str()],
            Self::Relation { source, target, .. } => vec![source.as_str(), target.as_str()],
        }
    }
}

/// What part of a record was dropped during normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkippedKind {
    Node,
    Edge,
}

/// An extracted node or edge that could not be used
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    pub kind: SkippedKind,
    /// Position in `extracted_nodes` / `extracted_edges`
    pub index: usize,
    pub reason: String,
}

/// Normalized form of one input record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalUnit {
    pub doc_id: String,
    pub chunk: ChunkDescriptor,
    /// Deduplicated by canonical id, in order of first appearance
    pub entities: Vec<EntityDescriptor>,
    pub edges: Vec<EdgeDescriptor>,
    pub skipped: Vec<SkippedItem>,
}

impl CanonicalUnit {
    pub fn mention_count(&self) -> usize {
        self.edges
            .iter()
            .filter(|e| matches!(e, EdgeDescriptor::Mention { .. }))
            .count()
    }

    pub fn relation_count(&self) -> usize {
        self.edges.len() - self.mention_count()
    }
}

/// Outcome of a committed merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeResult {
    /// Entity descriptors merged
    pub entities: usize,
    /// Chunk -> Entity edges merged
    pub mentions: usize,
    /// Entity -> Entity edges merged
    pub relations: usize,
    /// Chunk carries the `Table` tag
    pub table: bool,
}

impl MergeResult {
    pub fn for_unit(unit: &CanonicalUnit) -> Self {
        Self {
            entities: unit.entities.len(),
            mentions: unit.mention_count(),
            relations: unit.relation_count(),
            table: unit.chunk.content_type.is_table(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content_type: ContentType) -> ChunkDescriptor {
        ChunkDescriptor {
            id: "c1".into(),
            doc_id: "d1".into(),
            text: "hello".into(),
            embedding: Vec::new(),
            page_number: None,
            content_type,
            summary: None,
            html_content: None,
            markdown_content: None,
        }
    }

    #[test]
    fn table_chunks_get_structural_tag() {
        let labels: Vec<_> = chunk(ContentType::Table)
            .labels()
            .iter()
            .map(|l| l.to_string())
            .collect();
        assert_eq!(labels, vec!["Chunk", "Table"]);

        let labels = chunk(ContentType::Text).labels();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].as_str(), "Chunk");

        assert_eq!(chunk(ContentType::from_raw("figure")).labels().len(), 1);
    }

    #[test]
    fn referenced_ids_include_edge_endpoints() {
        let unit = CanonicalUnit {
            doc_id: "d1".into(),
            chunk: chunk(ContentType::Text),
            entities: Vec::new(),
            edges: vec![
                EdgeDescriptor::Mention {
                    target: "nsf".into(),
                    kind: RelationKind::from_raw("mentions"),
                },
                EdgeDescriptor::Relation {
                    source: "omid_panahi".into(),
                    target: "nsf".into(),
                    kind: RelationKind::from_raw("funded_by"),
                },
            ],
            skipped: Vec::new(),
        };

        let result = MergeResult::for_unit(&unit);
        assert_eq!(result.mentions, 1);
        assert_eq!(result.relations, 1);
        assert!(!result.table);
    }
}
