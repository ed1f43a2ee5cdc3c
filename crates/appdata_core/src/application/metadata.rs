//! Application metadata as returned by the backend.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::data_source::ApplicationDataSourceConfig;
use crate::error::{CoreError, Result};

/// Attribute holding the per-application data source configuration
pub const DATA_SOURCES_ATTRIBUTE: &str = "dataSources";

/// Attributes that may arrive as comma-separated strings
const LIST_ATTRIBUTES: [&str; 2] = ["accounts", "cloudProviders"];

/// Raw application record: a name plus opaque attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    #[serde(default, alias = "applicationName")]
    pub name: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl ApplicationRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Parse the `dataSources` attribute.
    ///
    /// Returns `Ok(None)` when the attribute is absent or null.
    pub fn data_source_config(&self) -> Result<Option<ApplicationDataSourceConfig>> {
        match self.attributes.get(DATA_SOURCES_ATTRIBUTE) {
            None | Some(Value::Null) => Ok(None),
            Some(raw) => serde_json::from_value(raw.clone())
                .map(Some)
                .map_err(|cause| CoreError::InvalidDataSourceConfig {
                    application: self.name.clone(),
                    cause,
                }),
        }
    }

    /// Split list-valued attributes given as comma-separated strings.
    pub(crate) fn normalize_attributes(&mut self) {
        for key in LIST_ATTRIBUTES {
            if let Some(Value::String(raw)) = self.attributes.get(key) {
                let items: Vec<Value> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(|item| Value::String(item.to_string()))
                    .collect();
                self.attributes.insert(key.to_string(), Value::Array(items));
            }
        }
    }
}

/// Backend that serves application metadata.
#[async_trait]
pub trait ApplicationMetadataSource: Send + Sync + Debug {
    /// Fetch a single application by name
    async fn get_application(&self, name: &str) -> Result<ApplicationRecord>;

    /// List all known applications
    async fn list_applications(&self) -> Result<Vec<ApplicationRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_or_null_config_is_none() {
        let record = ApplicationRecord::new("deck");
        assert_eq!(record.data_source_config().unwrap(), None);

        let record = record.with_attribute(DATA_SOURCES_ATTRIBUTE, Value::Null);
        assert_eq!(record.data_source_config().unwrap(), None);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let record = ApplicationRecord::new("deck")
            .with_attribute(DATA_SOURCES_ATTRIBUTE, json!({ "enabled": "serverGroups" }));
        let err = record.data_source_config().unwrap_err();
        assert!(matches!(err, CoreError::InvalidDataSourceConfig { .. }));
    }

    #[test]
    fn test_normalize_splits_comma_lists() {
        let mut record = ApplicationRecord::new("deck")
            .with_attribute("accounts", json!("prod, test,,staging"))
            .with_attribute("cloudProviders", json!(["aws"]))
            .with_attribute("email", json!("a@b.c, d@e.f"));
        record.normalize_attributes();

        assert_eq!(record.attributes["accounts"], json!(["prod", "test", "staging"]));
        assert_eq!(record.attributes["cloudProviders"], json!(["aws"]));
        assert_eq!(record.attributes["email"], json!("a@b.c, d@e.f"));
    }

    #[test]
    fn test_deserialize_accepts_application_name_alias() {
        let record: ApplicationRecord =
            serde_json::from_value(json!({ "applicationName": "deck", "attributes": {} }))
                .unwrap();
        assert_eq!(record.name, "deck");
    }
}
