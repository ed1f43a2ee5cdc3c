//! Per-application activation of data sources.
//!
//! Given the registered descriptors and an application's `dataSources`
//! attribute, decide which sources are disabled for that application.
//!
//! Precedence:
//!
//! 1. No configuration (absent, or both lists empty): everything is active
//!    except opt-in sources.
//! 2. A non-empty `enabled` list is exhaustive: only listed sources are active.
//! 3. Otherwise sources listed in `disabled` are turned off on top of the
//!    defaults from (1).
//! 4. Non-optional sources cannot be turned off by (2) or (3).
//! 5. A source whose required sources are not all active is disabled as well.
//!
//! Keys that do not match any descriptor are ignored.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use super::DataSourceDescriptor;

/// The `dataSources` attribute of an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDataSourceConfig {
    /// Keys explicitly turned on
    #[serde(default)]
    pub enabled: Vec<CompactString>,
    /// Keys explicitly turned off
    #[serde(default)]
    pub disabled: Vec<CompactString>,
}

impl ApplicationDataSourceConfig {
    pub fn new<E, D>(enabled: E, disabled: D) -> Self
    where
        E: IntoIterator,
        E::Item: Into<CompactString>,
        D: IntoIterator,
        D::Item: Into<CompactString>,
    {
        Self {
            enabled: enabled.into_iter().map(Into::into).collect(),
            disabled: disabled.into_iter().map(Into::into).collect(),
        }
    }

    /// True when the configuration places no constraints at all
    pub fn is_unconstrained(&self) -> bool {
        self.enabled.is_empty() && self.disabled.is_empty()
    }
}

/// Resolved disabled flag per registered key, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationMap {
    entries: Vec<(CompactString, bool)>,
}

impl ActivationMap {
    /// Whether the given key is disabled. `None` for unregistered keys.
    pub fn is_disabled(&self, key: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, disabled)| *disabled)
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.is_disabled(key) == Some(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(k, d)| (k.as_str(), *d))
    }

    /// Keys of active sources, in registration order
    pub fn active_keys(&self) -> Vec<&str> {
        self.iter().filter(|(_, d)| !d).map(|(k, _)| k).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted key -> disabled view, handy for display and comparisons
    pub fn to_btree(&self) -> BTreeMap<String, bool> {
        self.iter().map(|(k, d)| (k.to_string(), d)).collect()
    }
}

/// Decide, for every descriptor, whether it is disabled for an application.
pub fn resolve_activation(
    descriptors: &[Arc<DataSourceDescriptor>],
    config: Option<&ApplicationDataSourceConfig>,
) -> ActivationMap {
    let config = config.filter(|c| !c.is_unconstrained());

    let mut entries: Vec<(CompactString, bool)> = descriptors
        .iter()
        .map(|descriptor| {
            let disabled = match config {
                None => descriptor.opt_in,
                Some(config) => {
                    let listed_enabled = config.enabled.contains(&descriptor.key);
                    let requested_off = if !config.enabled.is_empty() {
                        !listed_enabled
                    } else {
                        descriptor.opt_in || config.disabled.contains(&descriptor.key)
                    };
                    requested_off && (descriptor.optional || descriptor.opt_in)
                }
            };
            (descriptor.key.clone(), disabled)
        })
        .collect();

    disable_unmet_requirements(descriptors, &mut entries);

    for (key, disabled) in &entries {
        tracing::debug!(%key, disabled, "resolved data source activation");
    }

    ActivationMap { entries }
}

/// Propagate disablement along `required_data_sources` until nothing changes.
fn disable_unmet_requirements(
    descriptors: &[Arc<DataSourceDescriptor>],
    entries: &mut [(CompactString, bool)],
) {
    loop {
        let active: HashSet<CompactString> = entries
            .iter()
            .filter(|(_, disabled)| !disabled)
            .map(|(key, _)| key.clone())
            .collect();

        let mut changed = false;
        for (descriptor, (_, disabled)) in descriptors.iter().zip(entries.iter_mut()) {
            if *disabled {
                continue;
            }
            if let Some(missing) = descriptor
                .required_data_sources
                .iter()
                .find(|required| !active.contains(*required))
            {
                tracing::debug!(
                    key = %descriptor.key,
                    requires = %missing,
                    "disabling data source with inactive requirement"
                );
                *disabled = true;
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }
}
