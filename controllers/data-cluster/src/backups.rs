//! Failed backup detection
//!
//! A failed backup is surfaced on its cluster, except for continuous backups:
//! those stream logs, fail transiently, and recover by themselves.

use crate::error::ControllerError;
use crate::ownership::{OwnedObjectIndex, build_index, kind};
use crate::registry::TypeRegistry;
use crds::{Backup, BackupPhase, BackupType};
use kube_store::{LabelSelector, ListScope, ObjectStore};
use tracing::debug;

/// True if `backup` failed and is not a continuous backup.
///
/// No status means not failed; no type label means not continuous.
pub fn is_failed_backup(backup: &Backup) -> bool {
    backup.phase() == Some(BackupPhase::Failed)
        && backup.backup_type_label() != Some(BackupType::Continuous.as_str())
}

/// Index the failed, non-continuous backups under `scope` matching `selector`.
///
/// Merge the result into the cluster's owned index with
/// [`OwnedObjectIndex::merge`] to reconcile them alongside everything else.
pub async fn find_failed_backups(
    store: &dyn ObjectStore,
    registry: &TypeRegistry,
    scope: &ListScope,
    selector: &LabelSelector,
) -> Result<OwnedObjectIndex, ControllerError> {
    let mut index = build_index(store, registry, scope, selector, &[&kind::<Backup>()]).await?;
    let listed = index.len();

    index.retain(|_, obj| obj.downcast_ref::<Backup>().is_some_and(is_failed_backup));
    debug!("{} of {} backup(s) in {} failed", index.len(), listed, scope);

    Ok(index)
}
