//! File-backed collaborators for running the reader from the command line.
//!
//! Layout of a fixture directory:
//!
//! ```text
//! fixtures/
//!   deck.json              application record {"name": .., "attributes": {..}}
//!   deck/serverGroups.json payload of the serverGroups source
//!   deck/loadBalancers.json
//! ```

use std::path::{Path, PathBuf};

use appdata_core::{
    ApplicationMetadataSource, ApplicationRecord, CoreError, LoaderMap, Result, SourceLoader,
};
use async_trait::async_trait;
use serde_json::Value;

/// Reads application records from `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct FileMetadataSource {
    dir: PathBuf,
}

impl FileMetadataSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

async fn read_record(path: &Path, name: &str) -> Result<ApplicationRecord> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CoreError::metadata_fetch(name, e))?;
    let mut record: ApplicationRecord =
        serde_json::from_str(&content).map_err(|e| CoreError::metadata_fetch(name, e))?;
    if record.name.is_empty() {
        record.name = name.to_string();
    }
    Ok(record)
}

#[async_trait]
impl ApplicationMetadataSource for FileMetadataSource {
    async fn get_application(&self, name: &str) -> Result<ApplicationRecord> {
        let path = self.dir.join(format!("{name}.json"));
        tracing::debug!(path = %path.display(), "reading application record");
        read_record(&path, name).await
    }

    async fn list_applications(&self) -> Result<Vec<ApplicationRecord>> {
        let dir_name = self.dir.display().to_string();
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| CoreError::metadata_fetch(&dir_name, e))?;

        let mut records = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CoreError::metadata_fetch(&dir_name, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            records.push(read_record(&path, name).await?);
        }
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }
}

/// Loads one data source's payload from `<dir>/<application>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FixtureLoader {
    dir: PathBuf,
    key: String,
}

impl FixtureLoader {
    pub fn new(dir: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            key: key.into(),
        }
    }
}

#[async_trait]
impl SourceLoader for FixtureLoader {
    async fn load(&self, application: &ApplicationRecord) -> Result<Value> {
        let path = self
            .dir
            .join(&application.name)
            .join(format!("{}.json", self.key));
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| CoreError::source_load(self.key.as_str(), format!("{}: {e}", path.display())))?;
        serde_json::from_str(&content).map_err(|e| CoreError::source_load(self.key.as_str(), e))
    }
}

/// One fixture loader per registered key
pub fn fixture_loaders(dir: &Path, keys: &[String]) -> LoaderMap {
    let mut loaders = LoaderMap::new();
    for key in keys {
        loaders.insert(key.as_str(), std::sync::Arc::new(FixtureLoader::new(dir, key)));
    }
    loaders
}

#[cfg(test)]
mod tests {
    use super::*;
    use appdata_core::{ApplicationReader, DataSourceRegistry, LoadState, readers};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn write(path: &Path, value: &Value) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, serde_json::to_string(value).unwrap()).unwrap();
    }

    #[tokio::test]
    async fn test_fixture_application_loads_and_isolates_missing_payloads() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("deck.json"),
            &json!({ "name": "deck", "attributes": { "dataSources": { "disabled": ["securityGroups"] } } }),
        );
        write(
            &dir.path().join("deck").join("serverGroups.json"),
            &json!([{ "name": "deck-v001" }]),
        );

        let registry = Arc::new(DataSourceRegistry::new());
        readers::register_default_sources(&registry).unwrap();
        let reader = ApplicationReader::builder()
            .registry(registry.clone())
            .metadata(Arc::new(FileMetadataSource::new(dir.path())))
            .loaders(fixture_loaders(dir.path(), &registry.keys()))
            .build()
            .unwrap();

        let app = reader.get_application("deck").await.unwrap();
        let server_groups = app.get_data_source("serverGroups").unwrap();
        assert_eq!(server_groups.data(), &json!([{ "name": "deck-v001" }]));

        // No payload on disk for load balancers
        let load_balancers = app.get_data_source("loadBalancers").unwrap();
        assert_eq!(load_balancers.state(), LoadState::Failed);
        assert_eq!(load_balancers.data(), &json!([]));

        let security_groups = app.get_data_source("securityGroups").unwrap();
        assert!(security_groups.disabled());
        assert_eq!(security_groups.state(), LoadState::Idle);
    }

    #[tokio::test]
    async fn test_missing_application_is_metadata_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileMetadataSource::new(dir.path());
        let err = source.get_application("ghost").await.unwrap_err();
        assert!(matches!(err, CoreError::MetadataFetch { .. }));
    }

    #[tokio::test]
    async fn test_list_applications_reads_json_files_only() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("orca.json"), &json!({ "name": "orca" }));
        write(&dir.path().join("deck.json"), &json!({ "applicationName": "deck" }));
        write(&dir.path().join("deck").join("serverGroups.json"), &json!([]));
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let records = FileMetadataSource::new(dir.path())
            .list_applications()
            .await
            .unwrap();
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["deck", "orca"]);
    }
}
