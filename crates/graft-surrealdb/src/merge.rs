//! Graph merge engine
//!
//! Builds the single transaction that applies a [`CanonicalUnit`]. The
//! statement text is fixed; every id, tag, relation kind and property value
//! travels as a bound parameter.
//!
//! Nodes are records keyed by their identity (`document:⟨id⟩`, `chunk:⟨id⟩`,
//! `entity:⟨id⟩`). Edges are `graph_edge` records keyed by
//! `[source_table, source_id, kind, target_table, target_id]`, so upserting
//! an edge twice leaves one edge.

use serde_json::{json, Value};

use graft_core::{CanonicalUnit, EdgeDescriptor, Label};

const BEGIN: &str = "BEGIN TRANSACTION;";
const COMMIT: &str = "COMMIT TRANSACTION;";

const UPSERT_DOCUMENT: &str = "\
UPSERT type::thing('document', $doc_id) SET
    node_id = $doc_id,
    labels = array::union(labels ?? [], ['Document'])
RETURN NONE;";

// `{embedding}` is either `$embedding` or `NONE`
const UPSERT_CHUNK: &str = "\
UPSERT type::thing('chunk', $chunk_id) SET
    node_id = $chunk_id,
    labels = array::union(labels ?? [], $chunk_labels),
    text = $text,
    embedding = {embedding},
    page_number = $page_number,
    content_type = $content_type,
    doc_id = $doc_id,
    summary = $summary,
    html_content = $html_content,
    markdown_content = $markdown_content
RETURN NONE;";

const LINK_DOCUMENT: &str = "\
DELETE graph_edge WHERE kind = 'PART_OF'
    AND source = type::thing('chunk', $chunk_id)
    AND target != type::thing('document', $doc_id)
RETURN NONE;
UPSERT type::thing('graph_edge', ['chunk', $chunk_id, 'PART_OF', 'document', $doc_id]) SET
    source = type::thing('chunk', $chunk_id),
    target = type::thing('document', $doc_id),
    kind = 'PART_OF'
RETURN NONE;";

const MERGE_ENTITIES: &str = "\
FOR $entity IN $entities {
    UPSERT type::thing('entity', $entity.id)
        MERGE { node_id: $entity.id, properties: $entity.properties }
    RETURN NONE;
    UPDATE type::thing('entity', $entity.id)
        SET labels = array::union(labels ?? [], $entity.labels)
    RETURN NONE;
};";

const MERGE_MENTIONS: &str = "\
FOR $mention IN $mentions {
    UPSERT type::thing('entity', $mention.target) SET
        node_id = $mention.target,
        labels = array::union(labels ?? [], ['Entity'])
    RETURN NONE;
    UPSERT type::thing('graph_edge', ['chunk', $chunk_id, $mention.kind, 'entity', $mention.target]) SET
        source = type::thing('chunk', $chunk_id),
        target = type::thing('entity', $mention.target),
        kind = $mention.kind
    RETURN NONE;
};";

const MERGE_RELATIONS: &str = "\
FOR $relation IN $relations {
    UPSERT type::thing('entity', $relation.source) SET
        node_id = $relation.source,
        labels = array::union(labels ?? [], ['Entity'])
    RETURN NONE;
    UPSERT type::thing('entity', $relation.target) SET
        node_id = $relation.target,
        labels = array::union(labels ?? [], ['Entity'])
    RETURN NONE;
    UPSERT type::thing('graph_edge', ['entity', $relation.source, $relation.kind, 'entity', $relation.target]) SET
        source = type::thing('entity', $relation.source),
        target = type::thing('entity', $relation.target),
        kind = $relation.kind
    RETURN NONE;
};";

/// Statement text and bound parameters for one unit
#[derive(Debug, Clone, PartialEq)]
pub struct MergePlan {
    pub sql: String,
    pub params: Value,
}

impl MergePlan {
    pub fn for_unit(unit: &CanonicalUnit) -> Self {
        let chunk = &unit.chunk;

        // An empty embedding is left absent so the vector index skips the chunk
        let embedding = if chunk.has_embedding() {
            "$embedding"
        } else {
            "NONE"
        };

        let upsert_chunk = UPSERT_CHUNK.replace("{embedding}", embedding);
        let mut sql = String::with_capacity(2048);
        for statement in [BEGIN, UPSERT_DOCUMENT, upsert_chunk.as_str(), LINK_DOCUMENT] {
            sql.push_str(statement);
            sql.push('\n');
        }
        if !unit.entities.is_empty() {
            sql.push_str(MERGE_ENTITIES);
            sql.push('\n');
        }
        if unit.mention_count() > 0 {
            sql.push_str(MERGE_MENTIONS);
            sql.push('\n');
        }
        if unit.relation_count() > 0 {
            sql.push_str(MERGE_RELATIONS);
            sql.push('\n');
        }
        sql.push_str(COMMIT);

        let entities: Vec<Value> = unit
            .entities
            .iter()
            .map(|entity| {
                let mut labels = vec![Label::ENTITY];
                labels.extend(entity.labels.iter().map(Label::as_str));
                json!({
                    "id": entity.id,
                    "labels": labels,
                    "properties": entity.properties,
                })
            })
            .collect();

        let mut mentions = Vec::new();
        let mut relations = Vec::new();
        for edge in &unit.edges {
            match edge {
                EdgeDescriptor::Mention { target, kind } => {
                    mentions.push(json!({"target": target, "kind": kind}));
                }
                EdgeDescriptor::Relation {
                    source,
                    target,
                    kind,
                } => {
                    relations.push(json!({"source": source, "target": target, "kind": kind}));
                }
            }
        }

        let mut params = json!({
            "doc_id": unit.doc_id,
            "chunk_id": chunk.id,
            "chunk_labels": chunk.labels(),
            "text": chunk.text,
            "page_number": chunk.page_number,
            "content_type": chunk.content_type,
            "summary": chunk.summary,
            "html_content": chunk.html_content,
            "markdown_content": chunk.markdown_content,
            "entities": entities,
            "mentions": mentions,
            "relations": relations,
        });
        if chunk.has_embedding() {
            params["embedding"] = json!(chunk.embedding);
        }

        Self { sql, params }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_core::RecordNormalizer;

    fn plan(record: Value) -> MergePlan {
        MergePlan::for_unit(&RecordNormalizer::default().normalize(&record).unwrap())
    }

    #[test]
    fn minimal_unit_skips_entity_loops() {
        let plan = plan(json!({"doc_id": "d", "chunk_id": "c", "text": "t"}));
        assert!(plan.sql.starts_with("BEGIN TRANSACTION;"));
        assert!(plan.sql.ends_with("COMMIT TRANSACTION;"));
        assert!(plan.sql.contains("embedding = NONE"));
        assert!(!plan.sql.contains("FOR $entity"));
        assert!(!plan.sql.contains("FOR $mention"));
        assert!(plan.params.get("embedding").is_none());
        assert_eq!(plan.params["chunk_labels"], json!(["Chunk"]));
    }

    #[test]
    fn record_data_is_bound_not_interpolated() {
        let hostile = "x'); REMOVE TABLE chunk; --";
        let plan = plan(json!({
            "doc_id": hostile,
            "chunk_id": hostile,
            "text": hostile,
            "type": "table",
            "embedding": [0.5, 0.25],
            "extracted_nodes": [{"id": hostile, "label": hostile}],
            "extracted_edges": [
                {"source": hostile, "target": "b", "type": hostile},
                {"source": "a", "target": "b", "type": "knows"}
            ]
        }));

        assert!(!plan.sql.contains("REMOVE TABLE"));
        assert!(plan.sql.contains("embedding = $embedding"));
        assert!(plan.sql.contains("FOR $entity"));
        assert!(plan.sql.contains("FOR $mention"));
        assert!(plan.sql.contains("FOR $relation"));

        assert_eq!(plan.params["chunk_id"], json!(hostile));
        assert_eq!(plan.params["chunk_labels"], json!(["Chunk", "Table"]));
        assert_eq!(plan.params["embedding"], json!([0.5, 0.25]));
        assert_eq!(plan.params["mentions"][0]["kind"], json!("XREMOVETABLECHUNK"));
        assert_eq!(plan.params["relations"][0]["kind"], json!("KNOWS"));
        assert_eq!(
            plan.params["entities"][0]["labels"],
            json!(["Entity", "Xremovetablechunk"])
        );
    }

    #[test]
    fn optional_chunk_fields_are_null() {
        let plan = plan(json!({"doc_id": "d", "chunk_id": "c", "text": "t"}));
        assert_eq!(plan.params["page_number"], Value::Null);
        assert_eq!(plan.params["summary"], Value::Null);
        assert_eq!(plan.params["content_type"], json!("text"));
    }
}
