//! Record normalizer
//!
//! Turns one raw JSON Lines record into a [`CanonicalUnit`]. Only `doc_id`,
//! `chunk_id` and `text` are required; every optional field that is missing
//! or has the wrong shape falls back to null or empty instead of failing the
//! record. Extracted nodes and edges that cannot be used are dropped and
//! listed in [`CanonicalUnit::skipped`].

use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, warn};

use graft_config::NormalizeConfig;

use crate::error::NormalizeError;
use crate::identifier::{normalize_id, Label, LabelOverrides, RelationKind};
use crate::unit::{
    CanonicalUnit, ChunkDescriptor, ContentType, EdgeDescriptor, EntityDescriptor, SkippedItem,
    SkippedKind,
};
use crate::value::{properties_from_object, PropertyMap, PropertyValue};

/// Keys of an extracted node that never become properties
const RESERVED_NODE_KEYS: &[&str] = &["id", "label", "type", "properties"];

/// Stateless record to canonical unit transformation
#[derive(Debug, Clone, Default)]
pub struct RecordNormalizer {
    overrides: LabelOverrides,
}

impl RecordNormalizer {
    pub fn new(config: &NormalizeConfig) -> Self {
        Self {
            overrides: LabelOverrides::from_config(config),
        }
    }

    pub fn overrides(&self) -> &LabelOverrides {
        &self.overrides
    }

    /// Normalize one parsed record
    pub fn normalize(&self, record: &Value) -> Result<CanonicalUnit, NormalizeError> {
        let record = record.as_object().ok_or(NormalizeError::NotAnObject)?;

        // Read chunk_id first so the other errors can name the record
        let chunk_id = required_str(record, "chunk_id", None);
        let known_chunk = chunk_id.as_ref().ok().cloned();
        let doc_id = required_str(record, "doc_id", known_chunk.clone())?;
        let chunk_id = chunk_id?;
        let text = required_text(record, known_chunk)?;

        let chunk = chunk_descriptor(record, chunk_id, doc_id.clone(), text);
        let mut skipped = Vec::new();
        let entities = self.entities(record, &mut skipped);
        let edges = edges(record, &chunk.id, &mut skipped);

        if !skipped.is_empty() {
            warn!(
                chunk_id = %chunk.id,
                skipped = skipped.len(),
                "Dropped unusable extracted nodes or edges"
            );
        }
        debug!(
            chunk_id = %chunk.id,
            entities = entities.len(),
            edges = edges.len(),
            "Normalized record"
        );

        Ok(CanonicalUnit {
            doc_id,
            chunk,
            entities,
            edges,
            skipped,
        })
    }

    fn entities(
        &self,
        record: &Map<String, Value>,
        skipped: &mut Vec<SkippedItem>,
    ) -> Vec<EntityDescriptor> {
        let mut entities: Vec<EntityDescriptor> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for (index, node) in array_field(record, "extracted_nodes").iter().enumerate() {
            let Some(node) = node.as_object() else {
                skipped.push(skip(SkippedKind::Node, index, "node is not an object"));
                continue;
            };
            let Some(raw_id) = node.get("id").and_then(id_text) else {
                skipped.push(skip(SkippedKind::Node, index, "node has no usable 'id'"));
                continue;
            };
            let id = normalize_id(&raw_id);
            if id.is_empty() {
                skipped.push(skip(SkippedKind::Node, index, "node id is blank"));
                continue;
            }

            let raw_label = non_empty_str(node, "label")
                .or_else(|| non_empty_str(node, "type"))
                .unwrap_or(Label::UNKNOWN);
            let label = Label::from_raw(raw_label, &self.overrides);

            let descriptor = EntityDescriptor {
                id: id.clone(),
                labels: BTreeSet::from([label]),
                properties: node_properties(node),
            };

            match positions.get(&id) {
                Some(&position) => entities[position].absorb(descriptor),
                None => {
                    positions.insert(id, entities.len());
                    entities.push(descriptor);
                }
            }
        }

        entities
    }
}

fn chunk_descriptor(
    record: &Map<String, Value>,
    id: String,
    doc_id: String,
    text: String,
) -> ChunkDescriptor {
    let empty = Map::new();
    let metadata = record
        .get("metadata")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let content_type = record
        .get("type")
        .and_then(Value::as_str)
        .map(ContentType::from_raw)
        .unwrap_or_default();

    ChunkDescriptor {
        id,
        doc_id,
        text,
        embedding: embedding(record.get("embedding")),
        page_number: metadata.get("page_number").and_then(page_number),
        content_type,
        summary: optional_str(metadata, "summary"),
        html_content: optional_str(metadata, "html_content")
            .or_else(|| optional_str(metadata, "text_as_html")),
        markdown_content: optional_str(metadata, "markdown_content"),
    }
}

fn edges(
    record: &Map<String, Value>,
    chunk_id: &str,
    skipped: &mut Vec<SkippedItem>,
) -> Vec<EdgeDescriptor> {
    let mut edges = Vec::new();
    let mut seen = HashSet::new();

    for (index, edge) in array_field(record, "extracted_edges").iter().enumerate() {
        let Some(edge) = edge.as_object() else {
            skipped.push(skip(SkippedKind::Edge, index, "edge is not an object"));
            continue;
        };
        let (Some(source), Some(target), Some(kind)) = (
            edge.get("source").and_then(id_text),
            edge.get("target").and_then(id_text),
            edge.get("type").and_then(Value::as_str),
        ) else {
            skipped.push(skip(
                SkippedKind::Edge,
                index,
                "edge needs 'source', 'target' and 'type'",
            ));
            continue;
        };

        let kind = RelationKind::from_raw(kind);
        let target = normalize_id(&target);
        let descriptor = if source == chunk_id {
            EdgeDescriptor::Mention { target, kind }
        } else {
            EdgeDescriptor::Relation {
                source: normalize_id(&source),
                target,
                kind,
            }
        };

        if descriptor.entity_endpoints().iter().any(|id| id.is_empty()) {
            skipped.push(skip(SkippedKind::Edge, index, "edge endpoint is blank"));
            continue;
        }
        if seen.insert(descriptor.clone()) {
            edges.push(descriptor);
        }
    }

    edges
}

fn node_properties(node: &Map<String, Value>) -> PropertyMap {
    match node.get("properties").and_then(Value::as_object) {
        Some(nested) if !nested.is_empty() => properties_from_object(nested, &[]),
        _ => properties_from_object(node, RESERVED_NODE_KEYS),
    }
}

fn required_str(
    record: &Map<String, Value>,
    field: &'static str,
    chunk_id: Option<String>,
) -> Result<String, NormalizeError> {
    match record.get(field) {
        None | Some(Value::Null) => Err(NormalizeError::MissingField { field, chunk_id }),
        Some(value) => match id_text(value) {
            Some(text) if !text.trim().is_empty() => Ok(text),
            Some(_) => Err(NormalizeError::MissingField { field, chunk_id }),
            None => Err(NormalizeError::InvalidField { field, chunk_id }),
        },
    }
}

// Chunk text may legitimately be empty, so it only has to be present
fn required_text(
    record: &Map<String, Value>,
    chunk_id: Option<String>,
) -> Result<String, NormalizeError> {
    match record.get("text") {
        None | Some(Value::Null) => Err(NormalizeError::MissingField {
            field: "text",
            chunk_id,
        }),
        Some(value) => id_text(value).ok_or(NormalizeError::InvalidField {
            field: "text",
            chunk_id,
        }),
    }
}

/// Strings as-is, numbers rendered as text
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty_str<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn optional_str(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

fn array_field<'a>(record: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    record
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn page_number(value: &Value) -> Option<i64> {
    match PropertyValue::from_json(value) {
        PropertyValue::Int(i) => Some(i),
        PropertyValue::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(f as i64),
        _ => None,
    }
}

fn embedding(value: Option<&Value>) -> Vec<f32> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32))
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default()
}

fn skip(kind: SkippedKind, index: usize, reason: &str) -> SkippedItem {
    SkippedItem {
        kind,
        index,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalizer() -> RecordNormalizer {
        let mut config = NormalizeConfig::default();
        config
            .label_overrides
            .insert("Organization".into(), "Dbo_Organisation".into());
        RecordNormalizer::new(&config)
    }

    fn base() -> Value {
        json!({"doc_id": "doc-1", "chunk_id": "doc-1#0", "text": "Panahi leads the lab."})
    }

    #[test]
    fn minimal_record_gets_defaults() {
        let unit = normalizer().normalize(&base()).unwrap();
        assert_eq!(unit.doc_id, "doc-1");
        assert_eq!(unit.chunk.id, "doc-1#0");
        assert_eq!(unit.chunk.doc_id, "doc-1");
        assert!(unit.chunk.embedding.is_empty());
        assert_eq!(unit.chunk.content_type, ContentType::Text);
        assert_eq!(unit.chunk.page_number, None);
        assert!(unit.entities.is_empty());
        assert!(unit.edges.is_empty());
    }

    #[test]
    fn missing_required_fields_are_named() {
        for field in ["doc_id", "chunk_id", "text"] {
            let mut record = base();
            record.as_object_mut().unwrap().remove(field);
            let err = normalizer().normalize(&record).unwrap_err();
            assert!(
                matches!(err, NormalizeError::MissingField { field: f, .. } if f == field),
                "{field}: {err:?}"
            );
        }
    }

    #[test]
    fn missing_field_error_carries_chunk_id() {
        let record = json!({"chunk_id": "c-9", "text": "x"});
        let err = normalizer().normalize(&record).unwrap_err();
        assert_eq!(err.chunk_id(), Some("c-9"));
    }

    #[test]
    fn null_and_wrong_typed_required_fields() {
        let record = json!({"doc_id": null, "chunk_id": "c", "text": "x"});
        assert!(matches!(
            normalizer().normalize(&record),
            Err(NormalizeError::MissingField { field: "doc_id", .. })
        ));

        let record = json!({"doc_id": ["d"], "chunk_id": "c", "text": "x"});
        assert!(matches!(
            normalizer().normalize(&record),
            Err(NormalizeError::InvalidField { field: "doc_id", .. })
        ));

        let record = json!({"doc_id": 42, "chunk_id": 7, "text": ""});
        let unit = normalizer().normalize(&record).unwrap();
        assert_eq!(unit.doc_id, "42");
        assert_eq!(unit.chunk.id, "7");
    }

    #[test]
    fn non_object_record_is_rejected() {
        assert_eq!(
            normalizer().normalize(&json!([1, 2])),
            Err(NormalizeError::NotAnObject)
        );
    }

    #[test]
    fn chunk_metadata_is_extracted() {
        let record = json!({
            "doc_id": "d", "chunk_id": "c", "text": "t",
            "type": "table",
            "embedding": [0.25, 0.5, 1],
            "metadata": {
                "page_number": 3.0,
                "summary": "Budget table",
                "html_content": null,
                "text_as_html": "<table></table>",
                "markdown_content": "| a |"
            }
        });
        let unit = normalizer().normalize(&record).unwrap();
        assert!(unit.chunk.content_type.is_table());
        assert_eq!(unit.chunk.embedding, vec![0.25, 0.5, 1.0]);
        assert_eq!(unit.chunk.page_number, Some(3));
        assert_eq!(unit.chunk.summary.as_deref(), Some("Budget table"));
        assert_eq!(unit.chunk.html_content.as_deref(), Some("<table></table>"));
        assert_eq!(unit.chunk.markdown_content.as_deref(), Some("| a |"));
    }

    #[test]
    fn malformed_optional_fields_fall_back() {
        let record = json!({
            "doc_id": "d", "chunk_id": "c", "text": "t",
            "type": 5,
            "embedding": [0.1, "x"],
            "metadata": {"page_number": "four", "summary": 12},
            "extracted_nodes": "none",
            "extracted_edges": {"source": "c"}
        });
        let unit = normalizer().normalize(&record).unwrap();
        assert_eq!(unit.chunk.content_type, ContentType::Text);
        assert!(unit.chunk.embedding.is_empty());
        assert_eq!(unit.chunk.page_number, None);
        assert_eq!(unit.chunk.summary, None);
        assert!(unit.entities.is_empty());
        assert!(unit.edges.is_empty());

        let mut record = base();
        record["metadata"] = json!("flat");
        assert!(normalizer().normalize(&record).is_ok());
    }

    #[test]
    fn nodes_get_canonical_ids_and_labels() {
        let mut record = base();
        record["extracted_nodes"] = json!([
            {"id": "Omid Panahi", "label": "person", "properties": {"role": "PI"}},
            {"id": "NSF", "type": "organization", "country": "US"},
            {"id": "Mystery"}
        ]);
        let unit = normalizer().normalize(&record).unwrap();

        let ids: Vec<_> = unit.entities.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["omid_panahi", "nsf", "mystery"]);

        let labels: Vec<Vec<&str>> = unit
            .entities
            .iter()
            .map(|e| e.labels.iter().map(Label::as_str).collect())
            .collect();
        assert_eq!(
            labels,
            vec![vec!["Person"], vec!["Dbo_Organisation"], vec!["Unknown"]]
        );

        assert_eq!(
            unit.entities[0].properties.get("role"),
            Some(&PropertyValue::from("PI"))
        );
        // Flat properties exclude the reserved keys
        let nsf = &unit.entities[1].properties;
        assert_eq!(nsf.len(), 1);
        assert_eq!(nsf.get("country"), Some(&PropertyValue::from("US")));
    }

    #[test]
    fn empty_nested_properties_fall_back_to_flat_keys() {
        let mut record = base();
        record["extracted_nodes"] = json!([
            {"id": "lab", "label": "Org", "properties": {}, "city": "Kigali"}
        ]);
        let unit = normalizer().normalize(&record).unwrap();
        let props = &unit.entities[0].properties;
        assert_eq!(props.len(), 1);
        assert_eq!(props.get("city"), Some(&PropertyValue::from("Kigali")));
    }

    #[test]
    fn duplicate_nodes_in_one_record_are_merged() {
        let mut record = base();
        record["extracted_nodes"] = json!([
            {"id": "Omid Panahi", "label": "Person", "properties": {"role": "PI", "dept": "CS"}},
            {"id": "omid_panahi", "label": "Researcher", "properties": {"role": "Co-PI"}}
        ]);
        let unit = normalizer().normalize(&record).unwrap();
        assert_eq!(unit.entities.len(), 1);

        let entity = &unit.entities[0];
        let labels: Vec<_> = entity.labels.iter().map(Label::as_str).collect();
        assert_eq!(labels, vec!["Person", "Researcher"]);
        assert_eq!(entity.properties.get("role"), Some(&PropertyValue::from("Co-PI")));
        assert_eq!(entity.properties.get("dept"), Some(&PropertyValue::from("CS")));
    }

    #[test]
    fn unusable_nodes_are_skipped() {
        let mut record = base();
        record["extracted_nodes"] = json!([
            {"label": "Person"},
            {"id": "   ", "label": "Person"},
            "loose string",
            {"id": "kept"}
        ]);
        let unit = normalizer().normalize(&record).unwrap();
        assert_eq!(unit.entities.len(), 1);
        assert_eq!(unit.skipped.len(), 3);
        assert!(unit.skipped.iter().all(|s| s.kind == SkippedKind::Node));
        assert_eq!(
            unit.skipped.iter().map(|s| s.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn edges_are_classified_by_source() {
        let mut record = base();
        record["extracted_edges"] = json!([
            {"source": "doc-1#0", "target": "Omid Panahi", "type": "mentions"},
            {"source": "Omid Panahi", "target": "NSF Grant", "type": "funded by"},
            {"source": "Omid Panahi", "target": "NSF Grant", "type": "FUNDED_BY"},
            {"source": "Omid Panahi", "type": "knows"}
        ]);
        let unit = normalizer().normalize(&record).unwrap();

        assert_eq!(
            unit.edges,
            vec![
                EdgeDescriptor::Mention {
                    target: "omid_panahi".into(),
                    kind: RelationKind::from_raw("MENTIONS"),
                },
                EdgeDescriptor::Relation {
                    source: "omid_panahi".into(),
                    target: "nsf_grant".into(),
                    kind: RelationKind::from_raw("FUNDEDBY"),
                },
                EdgeDescriptor::Relation {
                    source: "omid_panahi".into(),
                    target: "nsf_grant".into(),
                    kind: RelationKind::from_raw("FUNDED_BY"),
                },
            ]
        );
        assert_eq!(unit.skipped.len(), 1);
        assert_eq!(unit.skipped[0].kind, SkippedKind::Edge);
        assert_eq!(unit.skipped[0].index, 3);
    }

    #[test]
    fn repeated_edges_are_deduplicated() {
        let mut record = base();
        record["extracted_edges"] = json!([
            {"source": "doc-1#0", "target": "NSF", "type": "MENTIONS"},
            {"source": "doc-1#0", "target": "nsf", "type": "mentions"}
        ]);
        let unit = normalizer().normalize(&record).unwrap();
        assert_eq!(unit.edges.len(), 1);
    }

    #[test]
    fn chunk_origin_uses_raw_chunk_id() {
        // The chunk id is compared as written, not canonicalized
        let mut record = base();
        record["extracted_edges"] = json!([
            {"source": "DOC-1#0", "target": "x", "type": "mentions"}
        ]);
        let unit = normalizer().normalize(&record).unwrap();
        assert!(matches!(unit.edges[0], EdgeDescriptor::Relation { .. }));
    }
}
