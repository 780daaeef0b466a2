//! Object store capabilities for DCops controllers
//!
//! The controllers only need two things from the Kubernetes API: listing the
//! objects of a kind under a scope and label selector, and creating core/v1
//! events. This crate defines those capabilities as traits, implements them
//! over `kube::Client`, and (with the `test-util` feature) provides in-memory
//! mocks for unit tests.
//!
//! # Example
//!
//! ```no_run
//! use k8s_openapi::api::core::v1::ConfigMap;
//! use kube::core::ApiResource;
//! use kube_store::{KubeObjectStore, LabelSelector, ListScope, ObjectStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = KubeObjectStore::try_default().await?;
//! let selector = LabelSelector::new().with("app.kubernetes.io/instance", "pg-main");
//! let items = store
//!     .list(&ApiResource::erase::<ConfigMap>(&()), &ListScope::namespace("default"), &selector)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod selector;
#[path = "trait.rs"]
pub mod store_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::{KubeEventConnector, KubeEventStore, KubeObjectStore};
pub use error::StoreError;
pub use selector::{LabelSelector, ListScope};
pub use store_trait::{EventStore, EventStoreConnector, ObjectStore};
#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockEventConnector, MockEventStore, MockObjectStore};
