//! Schema initializer behaviour against the in-memory store

use graft_config::SchemaConfig;
use graft_core::test_support::InMemoryGraphStore;
use graft_core::{
    IndexState, NodeKind, SchemaError, SchemaInitializer, StoreError, VectorIndexSpec,
};

fn initializer(attempts: u32) -> SchemaInitializer {
    SchemaInitializer::new(SchemaConfig {
        vector_dimension: 4,
        index_poll_attempts: attempts,
        ..Default::default()
    })
}

#[tokio::test]
async fn creates_constraints_and_index_once() {
    let store = InMemoryGraphStore::new();

    let first = initializer(5).ensure_schema(&store).await.unwrap();
    assert_eq!(first.constraints_created, NodeKind::ALL.to_vec());
    assert_eq!(first.constraints_ensured, 3);
    assert!(first.index_created);
    assert_eq!(first.polls, 1);

    let second = initializer(5).ensure_schema(&store).await.unwrap();
    assert!(second.constraints_created.is_empty());
    assert_eq!(second.constraints_ensured, 3);
    assert!(!second.index_created);

    let indexes = store.vector_indexes();
    assert_eq!(indexes.len(), 1);
    assert_eq!(indexes[0].name(), "chunk_embedding_index");
    assert_eq!(indexes[0].dimension(), 4);
}

#[tokio::test]
async fn existing_index_is_not_recreated() {
    let store = InMemoryGraphStore::new();
    store.add_vector_index(VectorIndexSpec::new("chunk_embedding_index", 4, false).unwrap());

    let report = initializer(5).ensure_schema(&store).await.unwrap();
    assert!(!report.index_created);
    assert_eq!(store.vector_indexes().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn waits_for_populating_index() {
    let store = InMemoryGraphStore::new();
    store.script_index_states(vec![
        Ok(IndexState::Missing),
        Ok(IndexState::Populating("indexing 10 of 40".into())),
        Err(StoreError::Query("status unavailable".into())),
    ]);

    let report = initializer(10).ensure_schema(&store).await.unwrap();
    assert_eq!(report.polls, 4);
    assert_eq!(store.state_checks(), 4);
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_poll_budget() {
    let store = InMemoryGraphStore::new();
    store.script_index_states(
        (0..5)
            .map(|_| Ok(IndexState::Populating("started".into())))
            .collect(),
    );

    let err = initializer(3).ensure_schema(&store).await.unwrap_err();
    assert!(matches!(
        err,
        SchemaError::IndexNotOnline { attempts: 3, .. }
    ));
    assert_eq!(store.state_checks(), 3);
}

#[tokio::test]
async fn failed_index_is_fatal_immediately() {
    let store = InMemoryGraphStore::new();
    store.script_index_states(vec![Ok(IndexState::Failed("bad dimension".into()))]);

    let err = initializer(10).ensure_schema(&store).await.unwrap_err();
    assert!(matches!(err, SchemaError::IndexFailed { ref detail, .. } if detail == "bad dimension"));
    assert_eq!(store.state_checks(), 1);
}

#[tokio::test]
async fn unreachable_store_is_reported() {
    let store = InMemoryGraphStore::new();
    store.set_unreachable(true);

    let err = initializer(3).ensure_schema(&store).await.unwrap_err();
    assert!(matches!(err, SchemaError::Unreachable(StoreError::Connection(_))));
    assert!(store.constraints().is_empty());
}

#[tokio::test]
async fn connection_lost_while_polling_is_unreachable() {
    let store = InMemoryGraphStore::new();
    store.script_index_states(vec![Err(StoreError::Connection("socket closed".into()))]);

    let err = initializer(10).ensure_schema(&store).await.unwrap_err();
    assert!(matches!(err, SchemaError::Unreachable(_)));
}

#[tokio::test]
async fn invalid_index_name_is_rejected_before_ddl() {
    let store = InMemoryGraphStore::new();
    let init = SchemaInitializer::new(SchemaConfig {
        vector_index_name: "idx; REMOVE TABLE chunk".into(),
        ..Default::default()
    });

    let err = init.ensure_schema(&store).await.unwrap_err();
    assert!(matches!(
        err,
        SchemaError::IndexCreation {
            source: StoreError::InvalidIdentifier(_),
            ..
        }
    ));
    assert!(store.vector_indexes().is_empty());
}
