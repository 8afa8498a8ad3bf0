//! Error types shared by the ingestion components

use thiserror::Error;

use crate::store::NodeKind;

/// Result alias for graph store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// A record that cannot become a canonical unit
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("missing required field '{field}'{}", chunk_suffix(.chunk_id))]
    MissingField {
        field: &'static str,
        chunk_id: Option<String>,
    },

    #[error("field '{field}' must be a string{}", chunk_suffix(.chunk_id))]
    InvalidField {
        field: &'static str,
        chunk_id: Option<String>,
    },
}

impl NormalizeError {
    /// Chunk id of the offending record, when it could be read
    pub fn chunk_id(&self) -> Option<&str> {
        match self {
            Self::NotAnObject => None,
            Self::MissingField { chunk_id, .. } | Self::InvalidField { chunk_id, .. } => {
                chunk_id.as_deref()
            }
        }
    }
}

fn chunk_suffix(chunk_id: &Option<String>) -> String {
    match chunk_id {
        Some(id) => format!(" (chunk '{}')", id),
        None => String::new(),
    }
}

/// Graph store failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
}

impl StoreError {
    /// Worth retrying: the same statement may succeed on a later attempt
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Transaction(_))
    }

    /// The store cannot be reached at all
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

/// Fatal schema initialization failures
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("graph store is unreachable: {0}")]
    Unreachable(#[source] StoreError),

    #[error("failed to ensure uniqueness constraint on {kind}: {source}")]
    Constraint {
        kind: NodeKind,
        #[source]
        source: StoreError,
    },

    #[error("failed to create vector index '{name}': {source}")]
    IndexCreation {
        name: String,
        #[source]
        source: StoreError,
    },

    #[error("vector index '{name}' failed to build: {detail}")]
    IndexFailed { name: String, detail: String },

    #[error("vector index '{name}' did not come online after {attempts} checks")]
    IndexNotOnline { name: String, attempts: u32 },
}
