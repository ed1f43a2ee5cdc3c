//! Configuration for the data source registry.
//!
//! Loaded from TOML. Declares whether the built-in data sources are registered
//! and any additional sources a deployment wants:
//!
//! ```toml
//! register_defaults = true
//!
//! [[data_sources]]
//! key = "executions"
//! label = "Pipelines"
//! opt_in = true
//! default_data = []
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data_source::{DataSourceDescriptor, DataSourceRegistry};
use crate::error::{ConfigError, CoreError, Result};
use crate::readers::default_descriptors;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppDataConfig {
    /// Register serverGroups, loadBalancers and securityGroups
    #[serde(default = "default_register_defaults")]
    pub register_defaults: bool,

    /// Extra data sources, registered after the defaults
    #[serde(default)]
    pub data_sources: Vec<DataSourceDescriptor>,
}

fn default_register_defaults() -> bool {
    true
}

impl Default for AppDataConfig {
    fn default() -> Self {
        Self {
            register_defaults: true,
            data_sources: Vec::new(),
        }
    }
}

impl AppDataConfig {
    /// Load configuration from a specific file
    pub async fn load_from(path: &Path) -> Result<Self> {
        load_config(path).await
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str, origin: &str) -> Result<Self> {
        let mut config: AppDataConfig =
            toml::from_str(content).map_err(|e| CoreError::ConfigurationError {
                config_path: origin.to_string(),
                field: "content".to_string(),
                expected: "valid TOML configuration".to_string(),
                cause: ConfigError::TomlParse(e.to_string()),
            })?;
        config.validate(origin)?;
        config.normalize();
        Ok(config)
    }

    fn validate(&self, origin: &str) -> Result<()> {
        for (index, descriptor) in self.data_sources.iter().enumerate() {
            if descriptor.key.trim().is_empty() {
                return Err(CoreError::ConfigurationError {
                    config_path: origin.to_string(),
                    field: format!("data_sources[{index}].key"),
                    expected: "non-empty data source key".to_string(),
                    cause: ConfigError::InvalidValue {
                        field: "key".to_string(),
                        reason: "key must not be empty".to_string(),
                    },
                });
            }
        }
        Ok(())
    }

    /// `opt_in` implies `optional`, as with the descriptor builder
    fn normalize(&mut self) {
        for descriptor in &mut self.data_sources {
            if descriptor.opt_in && !descriptor.optional {
                tracing::debug!(key = %descriptor.key, "opt-in data source marked optional");
                descriptor.optional = true;
            }
        }
    }

    /// Register the configured data sources into a registry.
    ///
    /// Every key is checked before anything is registered, so a duplicate
    /// leaves the registry as it was.
    pub fn apply(&self, registry: &DataSourceRegistry) -> Result<()> {
        let mut descriptors = if self.register_defaults {
            default_descriptors()
        } else {
            Vec::new()
        };
        descriptors.extend(self.data_sources.iter().cloned());

        let mut seen = HashSet::new();
        for descriptor in &descriptors {
            if registry.contains(&descriptor.key) || !seen.insert(descriptor.key.clone()) {
                return Err(CoreError::DuplicateDataSource {
                    key: descriptor.key.clone(),
                });
            }
        }
        for descriptor in descriptors {
            registry.register_data_source(descriptor)?;
        }
        tracing::info!(count = registry.len(), "data sources registered");
        Ok(())
    }
}

/// Load configuration from a TOML file
pub async fn load_config(path: &Path) -> Result<AppDataConfig> {
    let content =
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CoreError::ConfigurationError {
                config_path: path.display().to_string(),
                field: "file".to_string(),
                expected: "readable TOML file".to_string(),
                cause: ConfigError::Io(e.to_string()),
            })?;

    AppDataConfig::from_toml(&content, &path.display().to_string())
}

/// Candidate configuration paths, in priority order
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("appdata.toml")];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("appdata").join("config.toml"));
    }
    paths
}

/// Load configuration from standard locations
pub async fn load_config_from_standard_locations() -> Result<AppDataConfig> {
    for path in config_paths() {
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading config");
            return load_config(&path).await;
        }
    }

    // No config found, return default
    Ok(AppDataConfig::default())
}
