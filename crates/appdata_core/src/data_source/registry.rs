//! Catalog of declared data sources.
//!
//! The registry is an explicit context object: callers create one at startup,
//! register descriptors into it, and hand an `Arc` of it to the
//! [`ApplicationReader`](crate::application::ApplicationReader). Resolution only
//! ever reads a snapshot taken through [`DataSourceRegistry::list_data_sources`].

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{CoreError, Result};

use super::DataSourceDescriptor;

/// Ordered, key-unique collection of data source descriptors.
#[derive(Debug, Default)]
pub struct DataSourceRegistry {
    sources: RwLock<Vec<Arc<DataSourceDescriptor>>>,
}

impl DataSourceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor.
    ///
    /// Fails with [`CoreError::DuplicateDataSource`] if the key is taken; the
    /// registry is left unchanged in that case.
    pub fn register_data_source(&self, descriptor: DataSourceDescriptor) -> Result<()> {
        let mut sources = self.sources.write();
        if sources.iter().any(|s| s.key == descriptor.key) {
            return Err(CoreError::DuplicateDataSource {
                key: descriptor.key,
            });
        }
        tracing::debug!(key = %descriptor.key, "registered data source");
        sources.push(Arc::new(descriptor));
        Ok(())
    }

    /// Remove every registered descriptor
    pub fn clear_data_sources(&self) {
        self.sources.write().clear();
    }

    /// Snapshot of all descriptors in registration order
    pub fn list_data_sources(&self) -> Vec<Arc<DataSourceDescriptor>> {
        self.sources.read().clone()
    }

    /// Get a descriptor by key
    pub fn get(&self, key: &str) -> Option<Arc<DataSourceDescriptor>> {
        self.sources.read().iter().find(|s| s.key == key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.sources.read().iter().any(|s| s.key == key)
    }

    /// All registered keys in registration order
    pub fn keys(&self) -> Vec<String> {
        self.sources.read().iter().map(|s| s.key.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.read().is_empty()
    }
}
