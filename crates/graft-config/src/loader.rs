use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::GraftConfig;
use crate::error::{ConfigError, ConfigResult};

/// Prefix shared by every environment override
pub const ENV_PREFIX: &str = "GRAFT_";

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Resolves, parses and layers configuration sources
pub struct ConfigLoader {
    env: EnvLookup,
    search_paths: Vec<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader reading the process environment and the default file locations
    pub fn new() -> Self {
        Self {
            env: Box::new(|key| std::env::var(key).ok()),
            search_paths: Self::default_locations(),
        }
    }

    /// Replace the environment lookup (used by tests to avoid touching process env)
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Box::new(lookup);
        self
    }

    /// Replace the implicit file locations searched when no file is given
    pub fn with_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.search_paths = paths;
        self
    }

    /// `./graft.toml`, then `<config dir>/graft/config.toml`
    pub fn default_locations() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("graft.toml")];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("graft").join("config.toml"));
        }
        paths
    }

    /// Load configuration from `explicit` (which must exist) or the first
    /// existing default location, apply environment overrides and validate.
    pub fn load(&self, explicit: Option<&Path>) -> ConfigResult<GraftConfig> {
        let mut config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => match self.search_paths.iter().find(|p| p.is_file()) {
                Some(path) => Self::load_from_file(path)?,
                None => {
                    debug!("No config file found, using defaults");
                    GraftConfig::default()
                }
            },
        };

        self.apply_env(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a single TOML file without overrides or validation
    pub fn load_from_file(path: &Path) -> ConfigResult<GraftConfig> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = GraftConfig::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    fn var(&self, name: &str) -> Option<String> {
        (self.env)(&format!("{}{}", ENV_PREFIX, name)).filter(|v| !v.is_empty())
    }

    fn apply_env(&self, config: &mut GraftConfig) -> ConfigResult<()> {
        if let Some(address) = self.var("STORE") {
            config.store.address = address;
        }
        if let Some(namespace) = self.var("NAMESPACE") {
            config.store.namespace = namespace;
        }
        if let Some(database) = self.var("DATABASE") {
            config.store.database = database;
        }
        if let Some(username) = self.var("USERNAME") {
            config.store.username = Some(username);
        }
        if let Some(password) = self.var("PASSWORD") {
            config.store.password = Some(password);
        }
        if let Some(dir) = self.var("INPUT_DIR") {
            config.input.directory = PathBuf::from(dir);
        }
        if let Some(index) = self.var("VECTOR_INDEX") {
            config.schema.vector_index_name = index;
        }
        if let Some(dimension) = self.var("VECTOR_DIMENSION") {
            config.schema.vector_dimension = dimension.parse().map_err(|_| {
                ConfigError::Validation(format!(
                    "{}VECTOR_DIMENSION must be a positive integer, got '{}'",
                    ENV_PREFIX, dimension
                ))
            })?;
        }
        if let Some(level) = self.var("LOG_LEVEL") {
            config.logging.level = level;
        }
        Ok(())
    }
}
