//! DCops CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for the data cluster controller:
//! - `DataCluster`: the owning object, authoritative for its components and volumes
//! - `Backup`: auxiliary data-protection resource owned by a `DataCluster`

pub mod backup;
pub mod data_cluster;
pub mod labels;

pub use backup::*;
pub use data_cluster::*;
pub use labels::*;
