//! Ingestion configuration
//!
//! Settings for the record normalizer, merge guard, batch loader and input
//! discovery.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Record normalizer settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Maps a title-cased label to the tag actually attached,
    /// e.g. `Organization = "Dbo_Organisation"`
    pub label_overrides: BTreeMap<String, String>,
}

/// Checks applied to a unit before it reaches the store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MergeConfig {
    /// Reject non-empty embeddings whose length differs from the index dimension
    pub enforce_embedding_dimension: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            enforce_embedding_dimension: true,
        }
    }
}

/// Batch loader settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoaderConfig {
    /// Retries for merge failures the store reports as transient
    pub merge_retries: u32,
    /// Linear backoff step between retries
    pub retry_backoff_ms: u64,
    /// Log a progress line every N records
    pub progress_every: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            merge_retries: 2,
            retry_backoff_ms: 200,
            progress_every: 50,
        }
    }
}

/// Input discovery settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InputConfig {
    /// Directory searched when no directory is given on the command line
    pub directory: PathBuf,
    /// Descend into subdirectories
    pub recursive: bool,
    /// File extension of input files, without the dot
    pub extension: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("graph_rag_files"),
            recursive: false,
            extension: "jsonl".to_string(),
        }
    }
}
