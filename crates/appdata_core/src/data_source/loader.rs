//! Loaders that fetch the backing data of a data source.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use compact_str::CompactString;
use serde_json::Value;

use crate::application::ApplicationRecord;
use crate::error::Result;

/// Fetches the payload of one data source for an application.
///
/// Loaders must be safe to call more than once and may fail independently of
/// each other; a failure only marks the source it belongs to.
#[async_trait]
pub trait SourceLoader: Send + Sync + Debug {
    async fn load(&self, application: &ApplicationRecord) -> Result<Value>;
}

/// Adapter turning an async closure into a [`SourceLoader`].
pub struct FnLoader<F> {
    name: &'static str,
    f: F,
}

impl<F> FnLoader<F> {
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> Debug for FnLoader<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnLoader").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<F, Fut> SourceLoader for FnLoader<F>
where
    F: Fn(ApplicationRecord) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    async fn load(&self, application: &ApplicationRecord) -> Result<Value> {
        (self.f)(application.clone()).await
    }
}

/// Mapping from data source key to the loader that serves it.
///
/// Populated once at composition time and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct LoaderMap {
    loaders: HashMap<CompactString, Arc<dyn SourceLoader>>,
}

impl LoaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loader for a key, replacing any previous one
    pub fn insert(&mut self, key: impl Into<CompactString>, loader: Arc<dyn SourceLoader>) {
        self.loaders.insert(key.into(), loader);
    }

    /// Builder-style variant of [`LoaderMap::insert`]
    pub fn with(mut self, key: impl Into<CompactString>, loader: Arc<dyn SourceLoader>) -> Self {
        self.insert(key, loader);
        self
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn SourceLoader>> {
        self.loaders.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.loaders.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}
