//! Graft core
//!
//! Store-agnostic building blocks for loading chunked, pre-embedded documents
//! into a property graph:
//!
//! - [`RecordNormalizer`] turns one JSON Lines record into a [`CanonicalUnit`]
//! - [`GraphStore`] is the storage seam the merge engine is implemented behind
//! - [`SchemaInitializer`] establishes constraints and the vector index
//!
//! ```rust
//! use graft_core::{RecordNormalizer, Label};
//! use serde_json::json;
//!
//! let normalizer = RecordNormalizer::default();
//! let unit = normalizer
//!     .normalize(&json!({
//!         "doc_id": "report.pdf",
//!         "chunk_id": "report.pdf#4",
//!         "text": "Omid Panahi leads the project.",
//!         "extracted_nodes": [{"id": "Omid Panahi", "label": "person"}]
//!     }))
//!     .unwrap();
//!
//! assert_eq!(unit.entities[0].id, "omid_panahi");
//! assert!(unit.entities[0].labels.iter().any(|l| l.as_str() == "Person"));
//! ```

pub mod error;
pub mod identifier;
pub mod normalizer;
pub mod schema;
pub mod store;
pub mod unit;
pub mod value;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use error::{NormalizeError, SchemaError, StoreError, StoreResult};
pub use identifier::{normalize_id, sanitize_token, title_case, Label, LabelOverrides, RelationKind};
pub use normalizer::RecordNormalizer;
pub use schema::{SchemaInitializer, SchemaReport};
pub use store::{
    html_prefix, ChunkSample, GraphStats, GraphStore, IndexState, NodeKind, VectorIndexSpec,
    HTML_PREFIX_CHARS,
};
pub use unit::{
    CanonicalUnit, ChunkDescriptor, ContentType, EdgeDescriptor, EntityDescriptor, MergeResult,
    SkippedItem, SkippedKind,
};
pub use value::{PropertyMap, PropertyValue};
