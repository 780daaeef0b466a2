//! Well-known label keys and values shared by the data cluster CRDs.

/// API group of all DCops data cluster CRDs
pub const API_GROUP: &str = "dcops.microscaler.io";

/// API group of the data protection CRDs (`Backup`)
pub const DATA_PROTECTION_GROUP: &str = "dataprotection.dcops.microscaler.io";

/// Label carrying the name of the `DataCluster` an object belongs to
pub const APP_INSTANCE_LABEL: &str = "app.kubernetes.io/instance";

/// Label carrying the `BackupType` of a `Backup`
pub const BACKUP_TYPE_LABEL: &str = "dataprotection.dcops.microscaler.io/backup-type";
