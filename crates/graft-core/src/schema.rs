//! Schema initializer
//!
//! Establishes the identity constraints and the chunk embedding index before
//! any record is loaded, then waits for the index to come online. Safe to run
//! any number of times.

use std::time::Duration;
use tracing::{debug, info, warn};

use graft_config::SchemaConfig;

use crate::error::{SchemaError, StoreError};
use crate::store::{GraphStore, IndexState, NodeKind, VectorIndexSpec};

/// What [`SchemaInitializer::ensure_schema`] did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaReport {
    /// Constraints that did not exist before this run
    pub constraints_created: Vec<NodeKind>,
    /// Constraints checked (created or already present)
    pub constraints_ensured: usize,
    pub index_name: String,
    pub index_created: bool,
    /// Status checks made while waiting for the index
    pub polls: u32,
}

pub struct SchemaInitializer {
    config: SchemaConfig,
}

impl SchemaInitializer {
    pub fn new(config: SchemaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Ensure constraints and the vector index exist, blocking until the index
    /// is online or the poll budget runs out.
    pub async fn ensure_schema(&self, store: &dyn GraphStore) -> Result<SchemaReport, SchemaError> {
        store
            .verify_connectivity()
            .await
            .map_err(SchemaError::Unreachable)?;

        let mut report = SchemaReport {
            index_name: self.config.vector_index_name.clone(),
            ..Default::default()
        };

        for kind in NodeKind::ALL {
            let created = store
                .ensure_unique_constraint(kind)
                .await
                .map_err(|source| lift(source, |source| SchemaError::Constraint { kind, source }))?;
            if created {
                info!("Created uniqueness constraint on {}", kind);
                report.constraints_created.push(kind);
            } else {
                debug!("Uniqueness constraint on {} already exists", kind);
            }
            report.constraints_ensured += 1;
        }

        let name = self.config.vector_index_name.clone();
        let spec = VectorIndexSpec::new(
            name.clone(),
            self.config.vector_dimension,
            self.config.concurrent_index_build,
        )
        .map_err(|source| SchemaError::IndexCreation {
            name: name.clone(),
            source,
        })?;

        let exists = store.has_vector_index(&name).await.map_err(|source| {
            lift(source, |source| SchemaError::IndexCreation {
                name: name.clone(),
                source,
            })
        })?;

        if exists {
            info!("Vector index {} already exists", name);
        } else {
            info!(
                "Creating vector index {} ({} dimensions, cosine)",
                name,
                spec.dimension()
            );
            store.create_vector_index(&spec).await.map_err(|source| {
                lift(source, |source| SchemaError::IndexCreation {
                    name: name.clone(),
                    source,
                })
            })?;
            report.index_created = true;
        }

        report.polls = self.wait_until_online(store, &name).await?;
        Ok(report)
    }

    async fn wait_until_online(&self, store: &dyn GraphStore, name: &str) -> Result<u32, SchemaError> {
        let interval = Duration::from_millis(self.config.index_poll_interval_ms);
        let attempts = self.config.index_poll_attempts.max(1);

        for attempt in 1..=attempts {
            match store.vector_index_state(name).await {
                Ok(IndexState::Online) => {
                    info!("Vector index {} is online", name);
                    return Ok(attempt);
                }
                Ok(IndexState::Failed(detail)) => {
                    return Err(SchemaError::IndexFailed {
                        name: name.to_string(),
                        detail,
                    });
                }
                Ok(state) => {
                    info!("Index status: {}. Waiting...", state);
                }
                Err(err) if err.is_connectivity() => return Err(SchemaError::Unreachable(err)),
                Err(err) => {
                    warn!("Error checking index status: {}. Waiting...", err);
                }
            }

            if attempt < attempts {
                tokio::time::sleep(interval).await;
            }
        }

        Err(SchemaError::IndexNotOnline {
            name: name.to_string(),
            attempts,
        })
    }
}

// Losing the connection mid-way is reported as unreachable, not as a DDL failure
fn lift(source: StoreError, other: impl FnOnce(StoreError) -> SchemaError) -> SchemaError {
    if source.is_connectivity() {
        SchemaError::Unreachable(source)
    } else {
        other(source)
    }
}
