//! DataCluster controller building blocks
//!
//! Reconciling a `DataCluster` means comparing what it declares with what
//! exists. This crate provides the pieces every reconcile pass uses:
//!
//! - [`registry`]: object keys and the type registry resolving them
//! - [`ownership`]: listing and indexing everything a cluster owns
//! - [`backups`]: failed backups to surface on the cluster
//! - [`equality`] and [`quantity`]: spec comparison tolerant of quantity spelling
//! - [`warning`]: warning events for reconcile errors
//! - [`error`]: controller errors and their classification
//!
//! # Example
//!
//! ```no_run
//! use crds::DataCluster;
//! use data_cluster_controller::{TypeRegistry, app_instance_selector, kind, owning_namespaced_objects};
//! use k8s_openapi::api::core::v1::{ConfigMap, Secret};
//! use kube_store::KubeObjectStore;
//!
//! # async fn example(cluster: &DataCluster) -> Result<(), Box<dyn std::error::Error>> {
//! let store = KubeObjectStore::try_default().await?;
//! let registry = TypeRegistry::new().with::<ConfigMap>().with::<Secret>();
//! let owned = owning_namespaced_objects(
//!     &store,
//!     &registry,
//!     "databases",
//!     &app_instance_selector(cluster),
//!     &[&kind::<ConfigMap>(), &kind::<Secret>()],
//! )
//! .await?;
//! println!("{} owned objects", owned.len());
//! # Ok(())
//! # }
//! ```

pub mod backups;
pub mod equality;
pub mod error;
pub mod ownership;
pub mod quantity;
pub mod registry;
pub mod warning;

pub use backups::{find_failed_backups, is_failed_backup};
pub use equality::{
    resource_list_equal, resource_requirements_equal, volume_claim_templates_equal,
    volume_resource_requirements_equal,
};
pub use error::{ControllerError, ErrorType, is_deferred, unwrap_controller_error};
pub use ownership::{
    COMPONENT_KIND, INSTANCE_SET_KIND, KindOf, OwnedKind, OwnedObjectIndex, app_instance_selector,
    build_index, is_controlled_by_kind, kind, owning_cluster_objects, owning_namespaced_objects,
};
pub use quantity::{ParsedQuantity, QuantityError, quantities_equal};
pub use registry::{ObjectKey, OwnedObject, TypeRegistry};
pub use warning::{EventRecorder, Severity, send_warning};
