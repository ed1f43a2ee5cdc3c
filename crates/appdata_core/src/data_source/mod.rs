//! # Data Sources
//!
//! A data source is a named, independently loadable slice of an application's
//! derived state (server groups, security groups, load balancers, ...).
//!
//! ## Overview
//!
//! - [`DataSourceDescriptor`]: static declaration of a source (key, opt-in,
//!   optional, default data, requirements)
//! - [`DataSourceRegistry`]: ordered catalog of descriptors with unique keys
//! - [`resolve_activation`]: pure decision of which sources are disabled for
//!   one application, driven by its [`ApplicationDataSourceConfig`]
//! - [`SourceLoader`] / [`LoaderMap`]: the capability used to fetch a source's
//!   payload, looked up by key
//!
//! ```ignore
//! let registry = DataSourceRegistry::new();
//! registry.register_data_source(
//!     DataSourceDescriptor::builder("executions")
//!         .opt_in(true)
//!         .default_data(json!([]))
//!         .build(),
//! )?;
//!
//! let config = ApplicationDataSourceConfig::new(["executions"], Vec::<&str>::new());
//! let activation = resolve_activation(&registry.list_data_sources(), Some(&config));
//! assert!(activation.is_active("executions"));
//! ```

mod activation;
mod descriptor;
mod loader;
mod registry;


pub use activation::{ActivationMap, ApplicationDataSourceConfig, resolve_activation};
pub use descriptor::{DataSourceDescriptor, DataSourceDescriptorBuilder};
pub use loader::{FnLoader, LoaderMap, SourceLoader};
pub use registry::DataSourceRegistry;
