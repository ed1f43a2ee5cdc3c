//! Application objects assembled from their data sources.
//!
//! An [`Application`] owns one [`DataSourceRecord`] per registered data source.
//! Records carry the resolved disabled flag, the current payload and the load
//! state of the source. Applications are produced by [`ApplicationReader`].

mod metadata;
mod reader;

pub use metadata::{ApplicationMetadataSource, ApplicationRecord, DATA_SOURCES_ATTRIBUTE};
pub use reader::{ApplicationReader, ApplicationReaderBuilder};

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::data_source::{ActivationMap, DataSourceDescriptor, LoaderMap};
use crate::error::{CoreError, Result};

/// Load state of a data source record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    /// Loader has not run (disabled, lazy, or no loader registered)
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Runtime state of one data source on one application.
#[derive(Debug, Clone, Serialize)]
pub struct DataSourceRecord {
    #[serde(skip)]
    descriptor: Arc<DataSourceDescriptor>,
    key: String,
    disabled: bool,
    data: Value,
    state: LoadState,
    error: Option<String>,
}

impl DataSourceRecord {
    fn new(descriptor: Arc<DataSourceDescriptor>, disabled: bool) -> Self {
        Self {
            key: descriptor.key.to_string(),
            data: descriptor.default_data.clone(),
            descriptor,
            disabled,
            state: LoadState::Idle,
            error: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn descriptor(&self) -> &DataSourceDescriptor {
        &self.descriptor
    }

    pub fn disabled(&self) -> bool {
        self.disabled
    }

    /// Loaded payload, or the descriptor's default data
    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    pub fn loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    /// Message of the last load failure, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn should_load_eagerly(&self) -> bool {
        !self.disabled && !self.descriptor.lazy
    }

    fn start_loading(&mut self) {
        self.state = LoadState::Loading;
    }

    fn settle(&mut self, result: Result<Value>) {
        match result {
            Ok(data) => {
                self.data = data;
                self.state = LoadState::Loaded;
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "data source failed to load");
                self.state = LoadState::Failed;
                self.error = Some(e.to_string());
            }
        }
    }
}

/// An application together with the runtime state of its data sources.
#[derive(Debug, Clone, Serialize)]
pub struct Application {
    name: String,
    attributes: Map<String, Value>,
    data_sources: Vec<DataSourceRecord>,
}

impl Application {
    /// Build an application with one idle record per descriptor.
    ///
    /// Descriptors missing from `activation` are treated as disabled.
    pub fn new(
        record: ApplicationRecord,
        descriptors: &[Arc<DataSourceDescriptor>],
        activation: &ActivationMap,
    ) -> Self {
        let data_sources = descriptors
            .iter()
            .map(|descriptor| {
                let disabled = activation.is_disabled(&descriptor.key).unwrap_or(true);
                DataSourceRecord::new(descriptor.clone(), disabled)
            })
            .collect();

        Self {
            name: record.name,
            attributes: record.attributes,
            data_sources,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Look up a data source record by key
    pub fn get_data_source(&self, key: &str) -> Option<&DataSourceRecord> {
        self.data_sources.iter().find(|ds| ds.key == key)
    }

    /// Like [`Application::get_data_source`], but unknown keys are an error
    pub fn data_source(&self, key: &str) -> Result<&DataSourceRecord> {
        self.get_data_source(key)
            .ok_or_else(|| CoreError::unknown_data_source(key, self.data_source_keys()))
    }

    /// All records in registration order
    pub fn data_sources(&self) -> &[DataSourceRecord] {
        &self.data_sources
    }

    pub fn data_source_keys(&self) -> Vec<String> {
        self.data_sources.iter().map(|ds| ds.key.clone()).collect()
    }

    /// Records that are not disabled
    pub fn enabled_data_sources(&self) -> impl Iterator<Item = &DataSourceRecord> {
        self.data_sources.iter().filter(|ds| !ds.disabled)
    }

    /// True once no record is still loading
    pub fn is_ready(&self) -> bool {
        !self.data_sources.iter().any(DataSourceRecord::loading)
    }

    /// Snapshot of the name and attributes handed to loaders
    pub fn record(&self) -> ApplicationRecord {
        ApplicationRecord {
            name: self.name.clone(),
            attributes: self.attributes.clone(),
        }
    }

    /// Reload a single data source.
    ///
    /// Disabled sources and sources without a loader are left untouched. A
    /// load failure is recorded on the source and also returned.
    pub async fn refresh_source(&mut self, key: &str, loaders: &LoaderMap) -> Result<()> {
        let index = self
            .data_sources
            .iter()
            .position(|ds| ds.key == key)
            .ok_or_else(|| CoreError::unknown_data_source(key, self.data_source_keys()))?;

        if self.data_sources[index].disabled {
            tracing::debug!(key, "skipping refresh of disabled data source");
            return Ok(());
        }
        let Some(loader) = loaders.get(key) else {
            tracing::debug!(key, "no loader registered for data source");
            return Ok(());
        };

        let record = self.record();
        let source = &mut self.data_sources[index];
        source.start_loading();
        source.settle(loader.load(&record).await);

        match (source.state, source.error()) {
            (LoadState::Failed, Some(cause)) => Err(CoreError::source_load(key, cause)),
            _ => Ok(()),
        }
    }

    /// Load every active, non-lazy source concurrently.
    ///
    /// Records are updated as each loader settles; this returns once all of
    /// them have. Failures stay on their own record.
    pub(crate) async fn load_eager_sources(&mut self, loaders: &LoaderMap) {
        use futures::stream::{FuturesUnordered, StreamExt};

        let record = self.record();
        let mut pending = FuturesUnordered::new();

        for (index, source) in self.data_sources.iter_mut().enumerate() {
            if !source.should_load_eagerly() {
                continue;
            }
            match loaders.get(&source.key) {
                Some(loader) => {
                    tracing::debug!(key = %source.key, "loading data source");
                    source.start_loading();
                    let record = &record;
                    pending.push(async move { (index, loader.load(record).await) });
                }
                None => {
                    tracing::debug!(key = %source.key, "no loader registered for data source");
                }
            }
        }

        while let Some((index, result)) = pending.next().await {
            self.data_sources[index].settle(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::{ApplicationDataSourceConfig, FnLoader, resolve_activation};
    use serde_json::json;

    fn descriptors() -> Vec<Arc<DataSourceDescriptor>> {
        vec![
            Arc::new(
                DataSourceDescriptor::builder("serverGroups")
                    .default_data(json!([]))
                    .build(),
            ),
            Arc::new(
                DataSourceDescriptor::builder("executions")
                    .lazy(true)
                    .default_data(json!([]))
                    .build(),
            ),
        ]
    }

    fn application(config: Option<&ApplicationDataSourceConfig>) -> Application {
        let descriptors = descriptors();
        let activation = resolve_activation(&descriptors, config);
        Application::new(ApplicationRecord::new("deck"), &descriptors, &activation)
    }

    fn loaders() -> LoaderMap {
        LoaderMap::new()
            .with(
                "serverGroups",
                Arc::new(FnLoader::new("serverGroups", |app: ApplicationRecord| async move {
                    Ok::<_, CoreError>(json!([{ "app": app.name }]))
                })),
            )
            .with(
                "executions",
                Arc::new(FnLoader::new("executions", |_app: ApplicationRecord| async {
                    Err::<Value, _>(CoreError::source_load("executions", "boom"))
                })),
            )
    }

    #[test]
    fn test_new_application_has_default_data() {
        let app = application(None);
        let source = app.get_data_source("serverGroups").unwrap();
        assert_eq!(source.data(), &json!([]));
        assert_eq!(source.state(), LoadState::Idle);
        assert!(app.get_data_source("unknown").is_none());
        assert!(matches!(
            app.data_source("unknown"),
            Err(CoreError::UnknownDataSource { .. })
        ));
    }

    #[tokio::test]
    async fn test_eager_load_skips_lazy_sources() {
        let mut app = application(None);
        app.load_eager_sources(&loaders()).await;

        assert!(app.is_ready());
        assert!(app.get_data_source("serverGroups").unwrap().loaded());
        let lazy = app.get_data_source("executions").unwrap();
        assert_eq!(lazy.state(), LoadState::Idle);
        assert!(!lazy.disabled());
    }

    #[tokio::test]
    async fn test_refresh_records_and_returns_failure() {
        let mut app = application(None);
        let err = app.refresh_source("executions", &loaders()).await.unwrap_err();
        assert!(matches!(err, CoreError::SourceLoad { .. }));

        let source = app.get_data_source("executions").unwrap();
        assert_eq!(source.state(), LoadState::Failed);
        assert!(source.error().unwrap().contains("boom"));
        assert_eq!(source.data(), &json!([]));
    }

    #[tokio::test]
    async fn test_refresh_ignores_disabled_source() {
        let config = ApplicationDataSourceConfig::new(["executions"], Vec::<&str>::new());
        let mut app = application(Some(&config));
        app.refresh_source("serverGroups", &loaders()).await.unwrap();

        let source = app.get_data_source("serverGroups").unwrap();
        assert!(source.disabled());
        assert_eq!(source.state(), LoadState::Idle);
    }

    #[tokio::test]
    async fn test_refresh_unknown_key_is_error() {
        let mut app = application(None);
        let err = app.refresh_source("nope", &loaders()).await.unwrap_err();
        assert!(matches!(err, CoreError::UnknownDataSource { .. }));
    }
}
