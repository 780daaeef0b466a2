//! Backup CRD
//!
//! A data-protection run for a `DataCluster`. Backups are auxiliary objects:
//! the cluster owns them through its instance label, and failed backups are
//! surfaced on the cluster unless they belong to a continuous (log-streaming)
//! backup, which fails and recovers on its own.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[kube(
    group = "dataprotection.dcops.microscaler.io",
    version = "v1alpha1",
    kind = "Backup",
    namespaced,
    status = "BackupStatus",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct BackupSpec {
    /// Name of the backup policy this backup was created from
    pub backup_policy_name: String,

    /// Backup method within the policy (e.g. "pg-basebackup", "wal-g-archive")
    pub backup_method: String,

    /// Retention period (e.g. "7d")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_period: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackupStatus {
    /// Backup phase
    #[serde(default)]
    pub phase: BackupPhase,

    /// Reason of the failure when phase is `Failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    /// Total size of the backup (quantity, e.g. "12Gi")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_size: Option<String>,

    /// Completion timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum BackupPhase {
    /// Accepted, not started yet
    #[default]
    New,

    /// In progress
    Running,

    /// Finished successfully
    Completed,

    /// Finished with an error
    Failed,

    /// Being deleted
    Deleting,

    /// Phase this version does not know about
    #[serde(other)]
    Unknown,
}

/// Kind of data a backup captures, recorded in the `BACKUP_TYPE_LABEL` label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum BackupType {
    /// Full snapshot
    Full,

    /// Changes since the previous backup
    Incremental,

    /// Changes since the last full backup
    Differential,

    /// Log streaming; expected to fail and self-heal
    Continuous,
}

impl BackupType {
    /// Label value of this backup type
    pub fn as_str(&self) -> &'static str {
        match self {
            BackupType::Full => "Full",
            BackupType::Incremental => "Incremental",
            BackupType::Differential => "Differential",
            BackupType::Continuous => "Continuous",
        }
    }
}

impl Backup {
    /// Current phase, `None` when the controller has not reported a status yet
    pub fn phase(&self) -> Option<BackupPhase> {
        self.status.as_ref().map(|s| s.phase)
    }

    /// Raw value of the backup-type label
    pub fn backup_type_label(&self) -> Option<&str> {
        self.metadata
            .labels
            .as_ref()
            .and_then(|labels| labels.get(crate::labels::BACKUP_TYPE_LABEL))
            .map(String::as_str)
    }
}
