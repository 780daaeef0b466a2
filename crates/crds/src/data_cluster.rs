//! DataCluster CRD
//!
//! The owning object of a database deployment. Everything a `DataCluster`
//! controls (workloads, services, volume claims, backups) carries the
//! `app.kubernetes.io/instance=<cluster>` label.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{ResourceRequirements, VolumeResourceRequirements};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[kube(
    group = "dcops.microscaler.io",
    version = "v1alpha1",
    kind = "DataCluster",
    namespaced,
    status = "DataClusterStatus",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct DataClusterSpec {
    /// Components making up the cluster (e.g. "postgresql", "proxy")
    #[serde(default)]
    pub components: Vec<ClusterComponentSpec>,

    /// Whether deleting the cluster also deletes its backups
    #[serde(default)]
    pub delete_backups_on_termination: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClusterComponentSpec {
    /// Component name, unique within the cluster
    pub name: String,

    /// Number of replicas
    #[serde(default = "default_replicas")]
    pub replicas: i32,

    /// Compute resources for the component's main container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<ResourceListsSchema>")]
    pub resources: Option<ResourceRequirements>,

    /// Persistent volume claim templates, in declaration order
    #[serde(default)]
    pub volume_claim_templates: Vec<ClusterVolumeClaimTemplate>,
}

fn default_replicas() -> i32 {
    1
}

/// A named persistent volume claim template of a component.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClusterVolumeClaimTemplate {
    /// Name of the volume, referenced by the component's volume mounts
    pub name: String,

    /// Labels propagated to the generated claims
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    /// Annotations propagated to the generated claims
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    /// Claim spec
    #[serde(default)]
    pub spec: VolumeClaimSpec,
}

/// Subset of `PersistentVolumeClaimSpec` a cluster author may set.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VolumeClaimSpec {
    /// Access modes (e.g. "ReadWriteOnce")
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub access_modes: Vec<String>,

    /// Storage requests and limits
    #[serde(default)]
    #[schemars(with = "ResourceListsSchema")]
    pub resources: VolumeResourceRequirements,

    /// Storage class of the claim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class_name: Option<String>,

    /// "Filesystem" or "Block"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_mode: Option<String>,

    /// Volume attributes class of the claim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_attributes_class_name: Option<String>,
}

/// Schema stand-in for the k8s-openapi requirement types, which carry
/// quantities as strings keyed by resource name.
#[derive(JsonSchema)]
#[allow(dead_code)] // Only used for schema generation
struct ResourceListsSchema {
    limits: Option<BTreeMap<String, String>>,
    requests: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataClusterStatus {
    /// Cluster phase
    #[serde(default)]
    pub phase: ClusterPhase,

    /// Human-readable detail for the current phase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Generation last processed by the controller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Last reconciliation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reconciled: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum ClusterPhase {
    /// Being created
    #[default]
    Creating,

    /// All components running
    Running,

    /// Spec change being rolled out
    Updating,

    /// Some components are not available
    Abnormal,

    /// All components failed
    Failed,

    /// Being deleted
    Deleting,
}
