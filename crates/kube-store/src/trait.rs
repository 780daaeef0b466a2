//! Object store capability traits
//!
//! Controllers only see the object store through these traits, so unit tests
//! can swap in the in-memory implementations from the `mock` module.
//! All async methods must be `Send` to work with Tokio's work-stealing runtime.

use crate::error::StoreError;
use crate::selector::{LabelSelector, ListScope};
use k8s_openapi::api::core::v1::Event;
use kube::core::{ApiResource, DynamicObject};

/// List capability of the object store
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// List all objects of one kind within `scope` whose labels match `selector`.
    ///
    /// Returned objects always carry their `apiVersion` and `kind`.
    async fn list(
        &self,
        resource: &ApiResource,
        scope: &ListScope,
        selector: &LabelSelector,
    ) -> Result<Vec<DynamicObject>, StoreError>;
}

/// Create capability for core/v1 events
#[async_trait::async_trait]
pub trait EventStore: Send + Sync {
    /// Create `event` in `namespace`
    async fn create_event(&self, namespace: &str, event: &Event) -> Result<(), StoreError>;
}

/// Builds a fresh `EventStore` (no pooling: one client per delivery)
#[async_trait::async_trait]
pub trait EventStoreConnector: Send + Sync {
    /// Construct a new store client
    async fn connect(&self) -> Result<Box<dyn EventStore>, StoreError>;
}
