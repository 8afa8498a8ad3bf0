//! Tests for layered configuration loading

use graft_config::{ConfigError, ConfigLoader};
use std::collections::HashMap;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn loader_with_env(vars: &[(&str, &str)]) -> ConfigLoader {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ConfigLoader::new()
        .with_search_paths(Vec::new())
        .with_env(move |key| vars.get(key).cloned())
}

fn write_config(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn test_defaults_without_file_or_env() {
    let config = loader_with_env(&[]).load(None).unwrap();
    assert_eq!(config.store.address, "rocksdb://graft.db");
    assert_eq!(config.schema.vector_dimension, 384);
    assert_eq!(config.input.directory.to_str(), Some("graph_rag_files"));
}

#[test]
fn test_file_values_are_loaded() {
    let file = write_config(
        r#"
        [store]
        address = "ws://localhost:8000"
        namespace = "kb"
        database = "docs"

        [schema]
        vector_dimension = 768
        vector_index_name = "chunk_vectors"

        [normalize.label_overrides]
        Fundingsource = "FundingSource"
        "#,
    );

    let config = loader_with_env(&[]).load(Some(file.path())).unwrap();
    assert_eq!(config.store.address, "ws://localhost:8000");
    assert_eq!(config.store.namespace, "kb");
    assert_eq!(config.schema.vector_dimension, 768);
    assert_eq!(config.schema.vector_index_name, "chunk_vectors");
    assert_eq!(
        config.normalize.label_overrides.get("Fundingsource").map(String::as_str),
        Some("FundingSource")
    );
    // Untouched sections keep their defaults
    assert_eq!(config.loader.progress_every, 50);
}

#[test]
fn test_env_overrides_file() {
    let file = write_config("[store]\naddress = \"ws://file:8000\"\n");
    let config = loader_with_env(&[
        ("GRAFT_STORE", "ws://env:8000"),
        ("GRAFT_USERNAME", "root"),
        ("GRAFT_PASSWORD", "secret"),
        ("GRAFT_VECTOR_DIMENSION", "16"),
    ])
    .load(Some(file.path()))
    .unwrap();

    assert_eq!(config.store.address, "ws://env:8000");
    assert_eq!(config.store.credentials(), Some(("root", "secret")));
    assert_eq!(config.schema.vector_dimension, 16);
}

#[test]
fn test_invalid_env_dimension_is_rejected() {
    let result = loader_with_env(&[("GRAFT_VECTOR_DIMENSION", "many")]).load(None);
    assert!(matches!(result, Err(ConfigError::Validation(_))));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = loader_with_env(&[]).load(Some(&dir.path().join("absent.toml")));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn test_malformed_file_is_a_parse_error() {
    let file = write_config("[schema]\nvector_dimension = \"wide\"\n");
    let result = loader_with_env(&[]).load(Some(file.path()));
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
fn test_first_existing_search_path_wins() {
    let dir = TempDir::new().unwrap();
    let second = dir.path().join("second.toml");
    std::fs::write(&second, "[store]\nnamespace = \"picked\"\n").unwrap();

    let config = ConfigLoader::new()
        .with_env(|_| None)
        .with_search_paths(vec![dir.path().join("missing.toml"), second])
        .load(None)
        .unwrap();

    assert_eq!(config.store.namespace, "picked");
}

#[test]
fn test_example_config_is_valid() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../graft.example.toml");
    let config = loader_with_env(&[]).load(Some(&path)).unwrap();

    assert_eq!(config.schema.vector_index_name, "chunk_embedding_index");
    assert_eq!(
        config.normalize.label_overrides.get("Organization").map(String::as_str),
        Some("Dbo_Organisation")
    );
    assert_eq!(config.normalize.label_overrides.len(), 6);
}
