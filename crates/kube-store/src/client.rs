//! Kubernetes-backed object store
//!
//! Lists go through `Api<DynamicObject>` so a single implementation serves
//! every kind; callers decode items into their typed resources.

use crate::error::StoreError;
use crate::selector::{LabelSelector, ListScope};
use crate::store_trait::{EventStore, EventStoreConnector, ObjectStore};
use k8s_openapi::api::core::v1::Event;
use kube::api::{Api, ListParams, PostParams};
use kube::core::{ApiResource, DynamicObject, TypeMeta};
use kube::Client;
use tracing::debug;

/// Object store backed by a Kubernetes API client
#[derive(Clone)]
pub struct KubeObjectStore {
    client: Client,
}

impl KubeObjectStore {
    /// Wrap an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the in-cluster config or the local kubeconfig
    pub async fn try_default() -> Result<Self, StoreError> {
        let client = Client::try_default()
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;
        Ok(Self::new(client))
    }
}

#[async_trait::async_trait]
impl ObjectStore for KubeObjectStore {
    async fn list(
        &self,
        resource: &ApiResource,
        scope: &ListScope,
        selector: &LabelSelector,
    ) -> Result<Vec<DynamicObject>, StoreError> {
        let api: Api<DynamicObject> = match scope {
            ListScope::Namespace(ns) => Api::namespaced_with(self.client.clone(), ns, resource),
            ListScope::Cluster => Api::all_with(self.client.clone(), resource),
        };

        let mut lp = ListParams::default();
        if !selector.is_empty() {
            lp = lp.labels(&selector.to_string());
        }

        debug!("Listing {} in {} (selector: '{}')", resource.kind, scope, selector);
        let list = api.list(&lp).await?;

        // List responses omit apiVersion/kind on items
        let items = list
            .items
            .into_iter()
            .map(|mut item| {
                if item.types.is_none() {
                    item.types = Some(TypeMeta {
                        api_version: resource.api_version.clone(),
                        kind: resource.kind.clone(),
                    });
                }
                item
            })
            .collect();
        Ok(items)
    }
}

/// Event store backed by a Kubernetes API client
#[derive(Clone)]
pub struct KubeEventStore {
    client: Client,
}

impl KubeEventStore {
    /// Wrap an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl EventStore for KubeEventStore {
    async fn create_event(&self, namespace: &str, event: &Event) -> Result<(), StoreError> {
        let api: Api<Event> = Api::namespaced(self.client.clone(), namespace);
        api.create(&PostParams::default(), event).await?;
        Ok(())
    }
}

/// Connector that builds a new Kubernetes client on every call
#[derive(Debug, Clone, Default)]
pub struct KubeEventConnector;

#[async_trait::async_trait]
impl EventStoreConnector for KubeEventConnector {
    async fn connect(&self) -> Result<Box<dyn EventStore>, StoreError> {
        let client = Client::try_default()
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;
        Ok(Box::new(KubeEventStore::new(client)))
    }
}
