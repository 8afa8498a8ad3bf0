use serde::{Deserialize, Serialize};

use crate::components::{
    InputConfig, LoaderConfig, LoggingConfig, MergeConfig, NormalizeConfig, SchemaConfig,
    StoreConfig,
};
use crate::error::{ConfigError, ConfigResult};
use crate::validation::is_valid_identifier;

/// Complete configuration for one graft run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GraftConfig {
    /// Graph store connection
    pub store: StoreConfig,
    /// Constraints and vector index
    pub schema: SchemaConfig,
    /// Record normalization
    pub normalize: NormalizeConfig,
    /// Pre-merge checks
    pub merge: MergeConfig,
    /// Batch loading
    pub loader: LoaderConfig,
    /// Input discovery
    pub input: InputConfig,
    /// Logging defaults
    pub logging: LoggingConfig,
}

impl GraftConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> ConfigResult<()> {
        if self.schema.vector_dimension == 0 {
            return Err(ConfigError::Validation(
                "schema.vector_dimension must be greater than zero".to_string(),
            ));
        }

        if !is_valid_identifier(&self.schema.vector_index_name) {
            return Err(ConfigError::Validation(format!(
                "schema.vector_index_name '{}' is not a valid identifier",
                self.schema.vector_index_name
            )));
        }

        if self.schema.index_poll_attempts == 0 {
            return Err(ConfigError::Validation(
                "schema.index_poll_attempts must be at least 1".to_string(),
            ));
        }

        for (from, to) in &self.normalize.label_overrides {
            if !is_valid_identifier(from) || !is_valid_identifier(to) {
                return Err(ConfigError::Validation(format!(
                    "label override '{}' -> '{}' must map identifiers to identifiers",
                    from, to
                )));
            }
        }

        if self.store.username.is_some() != self.store.password.is_some() {
            return Err(ConfigError::Validation(
                "store.username and store.password must be set together".to_string(),
            ));
        }

        if self.store.address.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store.address must not be empty".to_string(),
            ));
        }

        if self.input.extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::Validation(
                "input.extension must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
