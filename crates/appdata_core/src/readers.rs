//! Well-known data sources and the readers that back them.
//!
//! The readers themselves live outside this crate (they talk to the cloud
//! backend). This module defines the capabilities they provide and wraps each
//! one as a [`SourceLoader`] keyed by its data source.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::application::ApplicationRecord;
use crate::data_source::{DataSourceDescriptor, DataSourceRegistry, LoaderMap, SourceLoader};
use crate::error::Result;

pub const SERVER_GROUPS: &str = "serverGroups";
pub const SECURITY_GROUPS: &str = "securityGroups";
pub const LOAD_BALANCERS: &str = "loadBalancers";

/// Loads the server groups of an application's clusters.
#[async_trait]
pub trait ClusterService: Send + Sync + Debug {
    async fn load_server_groups(&self, application: &ApplicationRecord) -> Result<Value>;
}

/// Reads security groups and groups them per application.
#[async_trait]
pub trait SecurityGroupReader: Send + Sync + Debug {
    /// Load all security groups, indexed as the backend returns them
    async fn load_security_groups(&self) -> Result<Value>;

    /// Narrow the indexed groups down to those used by the application
    async fn get_application_security_groups(
        &self,
        application: &ApplicationRecord,
        groups_by_name: Value,
    ) -> Result<Value>;
}

/// Loads the load balancers of an application.
#[async_trait]
pub trait LoadBalancerReader: Send + Sync + Debug {
    async fn load_load_balancers(&self, application: &ApplicationRecord) -> Result<Value>;
}

#[derive(Debug)]
pub struct ServerGroupLoader(pub Arc<dyn ClusterService>);

#[async_trait]
impl SourceLoader for ServerGroupLoader {
    async fn load(&self, application: &ApplicationRecord) -> Result<Value> {
        self.0.load_server_groups(application).await
    }
}

#[derive(Debug)]
pub struct SecurityGroupLoader(pub Arc<dyn SecurityGroupReader>);

#[async_trait]
impl SourceLoader for SecurityGroupLoader {
    async fn load(&self, application: &ApplicationRecord) -> Result<Value> {
        let groups = self.0.load_security_groups().await?;
        self.0
            .get_application_security_groups(application, groups)
            .await
    }
}

#[derive(Debug)]
pub struct LoadBalancerLoader(pub Arc<dyn LoadBalancerReader>);

#[async_trait]
impl SourceLoader for LoadBalancerLoader {
    async fn load(&self, application: &ApplicationRecord) -> Result<Value> {
        self.0.load_load_balancers(application).await
    }
}

/// Descriptors of the built-in data sources, in registration order.
pub fn default_descriptors() -> Vec<DataSourceDescriptor> {
    vec![
        DataSourceDescriptor::builder(SERVER_GROUPS)
            .label("Clusters")
            .default_data(json!([]))
            .build(),
        DataSourceDescriptor::builder(LOAD_BALANCERS)
            .label("Load Balancers")
            .default_data(json!([]))
            .build(),
        DataSourceDescriptor::builder(SECURITY_GROUPS)
            .label("Firewalls")
            .default_data(json!([]))
            .build(),
    ]
}

/// Register the built-in data sources.
pub fn register_default_sources(registry: &DataSourceRegistry) -> Result<()> {
    for descriptor in default_descriptors() {
        registry.register_data_source(descriptor)?;
    }
    Ok(())
}

/// Loader map wiring each built-in data source to its reader.
pub fn default_loaders(
    clusters: Arc<dyn ClusterService>,
    security_groups: Arc<dyn SecurityGroupReader>,
    load_balancers: Arc<dyn LoadBalancerReader>,
) -> LoaderMap {
    LoaderMap::new()
        .with(SERVER_GROUPS, Arc::new(ServerGroupLoader(clusters)))
        .with(SECURITY_GROUPS, Arc::new(SecurityGroupLoader(security_groups)))
        .with(LOAD_BALANCERS, Arc::new(LoadBalancerLoader(load_balancers)))
}
