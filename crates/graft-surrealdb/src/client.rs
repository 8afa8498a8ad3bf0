//! SurrealDB client
//!
//! Thin wrapper around `Surreal<Any>` so one type covers every store address
//! graft accepts:
//!
//! - **Memory** (`mem://`): tests and dry runs
//! - **File** (`rocksdb://<path>`): embedded persistent store
//! - **Remote** (`ws://host:port`): a running SurrealDB server, usually with
//!   root credentials
//!
//! ```no_run
//! use graft_surrealdb::SurrealClient;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), graft_core::StoreError> {
//! let client = SurrealClient::connect_memory().await?;
//! client
//!     .execute("UPSERT type::thing('document', $id) SET node_id = $id", json!({"id": "a.pdf"}))
//!     .await?;
//! # Ok(())
//! # }
//! ```

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use surrealdb::{Response, Surreal};
use tracing::{debug, info};

use graft_config::StoreConfig;
use graft_core::{StoreError, StoreResult};

use crate::error::{classify, is_cascade};

/// SurrealDB connection
///
/// Uses Arc internally so cloning is cheap and never opens a second
/// connection (RocksDB refuses a second lock on the same directory).
#[derive(Clone)]
pub struct SurrealClient {
    inner: Arc<SurrealClientInner>,
}

struct SurrealClientInner {
    db: Surreal<Any>,
    config: StoreConfig,
}

impl std::fmt::Debug for SurrealClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurrealClient")
            .field("config", &self.inner.config)
            .finish()
    }
}

impl SurrealClient {
    /// Connect, sign in when credentials are configured, and select the
    /// namespace and database
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let timeout = Duration::from_secs(config.connect_timeout_secs.max(1));

        let db = tokio::time::timeout(timeout, any::connect(config.address.as_str()))
            .await
            .map_err(|_| {
                StoreError::Connection(format!(
                    "Timed out after {:?} connecting to {}",
                    timeout, config.address
                ))
            })?
            .map_err(|e| {
                StoreError::Connection(format!("Failed to connect to {}: {}", config.address, e))
            })?;

        if let Some((username, password)) = config.credentials() {
            db.signin(Root { username, password }).await.map_err(|e| {
                StoreError::Connection(format!("Authentication as '{}' failed: {}", username, e))
            })?;
            debug!("Signed in as root user {}", username);
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .map_err(|e| {
                StoreError::Connection(format!(
                    "Failed to use namespace '{}' and database '{}': {}",
                    config.namespace, config.database, e
                ))
            })?;

        info!(
            address = %config.address,
            namespace = %config.namespace,
            database = %config.database,
            "Connected to SurrealDB"
        );

        Ok(Self {
            inner: Arc::new(SurrealClientInner {
                db,
                config: config.clone(),
            }),
        })
    }

    /// In-memory database with the default namespace and database
    pub async fn connect_memory() -> StoreResult<Self> {
        Self::connect(&StoreConfig::memory()).await
    }

    /// Run a query with `params` (a JSON object, or null for none) bound as
    /// `$name` variables. Statement errors are turned into a [`StoreError`].
    pub async fn query(&self, sql: &str, params: Value) -> StoreResult<Response> {
        let mut query = self.inner.db.query(sql);

        if let Value::Object(map) = params {
            for (key, value) in map {
                query = query.bind((key, value));
            }
        }

        let mut response = query
            .await
            .map_err(|e| classify("Query execution failed", e))?;

        let mut errors: Vec<(usize, String)> = response
            .take_errors()
            .into_iter()
            .map(|(index, err)| (index, err.to_string()))
            .collect();
        if errors.is_empty() {
            return Ok(response);
        }

        // Report the statement that actually failed, not the ones cancelled with it
        errors.sort_by_key(|(index, _)| *index);
        let (index, message) = errors
            .iter()
            .find(|(_, message)| !is_cascade(message))
            .unwrap_or(&errors[0]);
        debug!(statement = index, "Query returned error: {}", message);
        Err(classify("Query returned error", message))
    }

    /// Run a query for its side effects only
    pub async fn execute(&self, sql: &str, params: Value) -> StoreResult<()> {
        self.query(sql, params).await.map(|_| ())
    }

    /// Round-trip to the server
    pub async fn health(&self) -> StoreResult<()> {
        self.inner
            .db
            .health()
            .await
            .map_err(|e| StoreError::Connection(format!("Health check failed: {}", e)))
    }

}
