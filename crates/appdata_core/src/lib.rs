//! AppData Core - Data Source Resolution for Applications
//!
//! This crate decides which data sources are active for an application and
//! loads the active ones concurrently into a single [`Application`] object.
//!
//! - [`DataSourceRegistry`] holds the declared sources
//! - [`resolve_activation`] maps an application's `dataSources` attribute to
//!   a per-source disabled flag
//! - [`ApplicationReader`] fetches application metadata, resolves activation
//!   and runs the loaders of the active sources

pub mod application;
pub mod config;
pub mod data_source;
pub mod error;
pub mod readers;

pub use application::{
    Application, ApplicationMetadataSource, ApplicationReader, ApplicationReaderBuilder,
    ApplicationRecord, DataSourceRecord, LoadState,
};
pub use config::AppDataConfig;
pub use data_source::{
    ActivationMap, ApplicationDataSourceConfig, DataSourceDescriptor, DataSourceRegistry,
    FnLoader, LoaderMap, SourceLoader, resolve_activation,
};
pub use error::{CoreError, Result};
