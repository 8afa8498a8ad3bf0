//! Graph store connection configuration

use serde::{Deserialize, Serialize};

/// Embedded RocksDB store in the working directory
pub const DEFAULT_ADDRESS: &str = "rocksdb://graft.db";

/// In-memory engine address
pub const MEMORY_ADDRESS: &str = "mem://";

/// Connection settings for the graph store
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    /// Store address: `mem://`, `rocksdb://<path>` or `ws://host:port`
    pub address: String,
    /// Namespace selected after connecting
    pub namespace: String,
    /// Database selected after connecting
    pub database: String,
    /// Root user name, only used together with `password`
    pub username: Option<String>,
    /// Root password, only used together with `username`
    pub password: Option<String>,
    /// Seconds to wait for the initial connection
    pub connect_timeout_secs: u64,
}

impl StoreConfig {
    /// Credentials as a pair, when both halves are configured
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }

    /// Default settings pointed at the in-memory engine
    pub fn memory() -> Self {
        Self {
            address: MEMORY_ADDRESS.to_string(),
            ..Default::default()
        }
    }

    /// True for the embedded in-memory engine, whose contents are gone once
    /// the process exits
    pub fn is_memory(&self) -> bool {
        self.address.starts_with("mem://") || self.address == "memory"
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            namespace: "graft".to_string(),
            database: "graft".to_string(),
            username: None,
            password: None,
            connect_timeout_secs: 30,
        }
    }
}

// Keeps the password out of logs
impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("address", &self.address)
            .field("namespace", &self.namespace)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_password() {
        let config = StoreConfig {
            username: Some("root".into()),
            password: Some("hunter2".into()),
            ..Default::default()
        };
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn default_store_is_persistent() {
        assert!(!StoreConfig::default().is_memory());
        assert!(StoreConfig::memory().is_memory());
        assert_eq!(StoreConfig::memory().namespace, "graft");
    }

    #[test]
    fn credentials_require_both_halves() {
        let mut config = StoreConfig {
            username: Some("root".into()),
            ..Default::default()
        };
        assert!(config.credentials().is_none());
        config.password = Some("root".into());
        assert_eq!(config.credentials(), Some(("root", "root")));
    }
}
