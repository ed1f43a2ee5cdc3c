//! Data source descriptors.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declaration of a named slice of application state.
///
/// Descriptors are registered once in a [`DataSourceRegistry`](super::DataSourceRegistry)
/// and are immutable afterwards; the registry hands out `Arc`s to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DataSourceDescriptor {
    /// Unique key, e.g. `serverGroups`
    pub key: CompactString,
    /// Human-readable label. Falls back to the key when empty.
    #[serde(default)]
    pub label: String,
    /// Whether the source is user-facing
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Whether the source may be turned off at all
    #[serde(default = "default_true")]
    pub optional: bool,
    /// Inactive unless explicitly enabled by the application
    #[serde(default)]
    pub opt_in: bool,
    /// Not loaded during application assembly, only on demand
    #[serde(default)]
    pub lazy: bool,
    /// Value exposed until (or unless) the loader succeeds
    #[serde(default)]
    pub default_data: Value,
    /// Keys that must be active for this source to be active
    #[serde(default)]
    pub required_data_sources: Vec<CompactString>,
}

fn default_true() -> bool {
    true
}

impl DataSourceDescriptor {
    /// Start building a descriptor with the given key.
    ///
    /// Defaults: visible, optional, not opt-in, eager, `default_data = null`.
    pub fn builder(key: impl Into<CompactString>) -> DataSourceDescriptorBuilder {
        DataSourceDescriptorBuilder::new(key)
    }

    pub fn label(&self) -> &str {
        if self.label.is_empty() {
            &self.key
        } else {
            &self.label
        }
    }
}

/// Fluent builder for [`DataSourceDescriptor`].
#[derive(Debug, Clone)]
pub struct DataSourceDescriptorBuilder {
    descriptor: DataSourceDescriptor,
}

impl DataSourceDescriptorBuilder {
    pub fn new(key: impl Into<CompactString>) -> Self {
        Self {
            descriptor: DataSourceDescriptor {
                key: key.into(),
                label: String::new(),
                visible: true,
                optional: true,
                opt_in: false,
                lazy: false,
                default_data: Value::Null,
                required_data_sources: Vec::new(),
            },
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.descriptor.label = label.into();
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.descriptor.visible = visible;
        self
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.descriptor.optional = optional;
        self
    }

    /// Mark the source as opt-in. Opt-in sources are always optional.
    pub fn opt_in(mut self, opt_in: bool) -> Self {
        self.descriptor.opt_in = opt_in;
        if opt_in {
            self.descriptor.optional = true;
        }
        self
    }

    pub fn lazy(mut self, lazy: bool) -> Self {
        self.descriptor.lazy = lazy;
        self
    }

    pub fn default_data(mut self, data: Value) -> Self {
        self.descriptor.default_data = data;
        self
    }

    /// Add a dependency on another data source
    pub fn requires(mut self, key: impl Into<CompactString>) -> Self {
        self.descriptor.required_data_sources.push(key.into());
        self
    }

    pub fn build(self) -> DataSourceDescriptor {
        self.descriptor
    }
}
