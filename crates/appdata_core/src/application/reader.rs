//! ApplicationReader: loads applications and their data sources.

use std::sync::Arc;

use crate::data_source::{DataSourceRegistry, LoaderMap, SourceLoader, resolve_activation};
use crate::error::{ConfigError, CoreError, Result};

use super::{Application, ApplicationMetadataSource, ApplicationRecord};

/// Assembles [`Application`]s from backend metadata and data source loaders.
///
/// The reader holds the registry it resolves against, the metadata backend,
/// and the loader for each data source key.
#[derive(Debug, Clone)]
pub struct ApplicationReader {
    registry: Arc<DataSourceRegistry>,
    metadata: Arc<dyn ApplicationMetadataSource>,
    loaders: LoaderMap,
}

impl ApplicationReader {
    /// Create a new builder for constructing an ApplicationReader
    pub fn builder() -> ApplicationReaderBuilder {
        ApplicationReaderBuilder::new()
    }

    pub fn registry(&self) -> &Arc<DataSourceRegistry> {
        &self.registry
    }

    pub fn loaders(&self) -> &LoaderMap {
        &self.loaders
    }

    /// Load an application and every data source that is active for it.
    ///
    /// Fails only if the application metadata cannot be fetched or its
    /// `dataSources` attribute is malformed. Individual source failures are
    /// recorded on the returned application.
    pub async fn get_application(&self, name: &str) -> Result<Application> {
        let mut record = self.metadata.get_application(name).await.map_err(|e| match e {
            CoreError::MetadataFetch { .. } => e,
            other => CoreError::metadata_fetch(name, other),
        })?;
        record.normalize_attributes();

        let config = record.data_source_config()?;
        let descriptors = self.registry.list_data_sources();
        let activation = resolve_activation(&descriptors, config.as_ref());

        let mut application = Application::new(record, &descriptors, &activation);
        application.load_eager_sources(&self.loaders).await;

        let failed = application
            .data_sources()
            .iter()
            .filter(|ds| ds.error().is_some())
            .count();
        tracing::info!(
            application = %application.name(),
            sources = application.data_sources().len(),
            active = activation.active_keys().len(),
            failed,
            "application loaded"
        );

        Ok(application)
    }

    /// List applications known to the metadata backend
    pub async fn list_applications(&self) -> Result<Vec<ApplicationRecord>> {
        self.metadata.list_applications().await
    }
}

/// Builder for [`ApplicationReader`].
#[derive(Debug, Default)]
pub struct ApplicationReaderBuilder {
    registry: Option<Arc<DataSourceRegistry>>,
    metadata: Option<Arc<dyn ApplicationMetadataSource>>,
    loaders: LoaderMap,
}

impl ApplicationReaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the data source registry (defaults to an empty registry)
    pub fn registry(mut self, registry: Arc<DataSourceRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the application metadata backend (required)
    pub fn metadata(mut self, metadata: Arc<dyn ApplicationMetadataSource>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Register the loader for a data source key
    pub fn loader(mut self, key: &str, loader: Arc<dyn SourceLoader>) -> Self {
        self.loaders.insert(key, loader);
        self
    }

    /// Replace all loaders at once
    pub fn loaders(mut self, loaders: LoaderMap) -> Self {
        self.loaders = loaders;
        self
    }

    pub fn build(self) -> Result<ApplicationReader> {
        let metadata = self.metadata.ok_or_else(|| CoreError::ConfigurationError {
            config_path: "ApplicationReaderBuilder".to_string(),
            field: "metadata".to_string(),
            expected: "application metadata source".to_string(),
            cause: ConfigError::MissingField("metadata".to_string()),
        })?;

        let registry = self.registry.unwrap_or_default();
        if self.loaders.is_empty() {
            tracing::debug!("application reader built without loaders");
        }
        for key in registry.keys() {
            if !self.loaders.contains(&key) {
                tracing::debug!(%key, "data source has no loader");
            }
        }

        Ok(ApplicationReader {
            registry,
            metadata,
            loaders: self.loaders,
        })
    }
}
