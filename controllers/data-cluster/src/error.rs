//! Controller-specific error types.
//!
//! Besides the usual upstream conversions this module carries the two
//! classifications reconcilers rely on: deferred work (`Requeue`), which is
//! not a failure, and typed reconcile errors whose `ErrorType` becomes the
//! reason of the warning event raised for them.

use kube::Error as KubeError;
use kube_store::StoreError;
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur in the DataCluster controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Object store error (list failed, store unreachable)
    #[error("Object store error: {0}")]
    Store(#[from] StoreError),

    /// Object type has no registered group/version/kind
    #[error("Kind not registered: {0}")]
    UnregisteredKind(String),

    /// A listed object could not be decoded into its typed resource
    #[error("Failed to decode {kind}: {message}")]
    Decode { kind: String, message: String },

    /// Work is not finished yet; reconcile again later. Not a failure.
    #[error("Requeue after {after:?}: {reason}")]
    Requeue { after: Duration, reason: String },

    /// Reconciliation failed with a classified cause
    #[error("{message}")]
    Reconcile { error_type: ErrorType, message: String },
}

/// Classified reconcile failure, reported as the warning event reason
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Cannot succeed without a spec or environment change
    Fatal,
    /// A referenced object does not exist
    NotFound,
    /// The cluster spec is inconsistent
    InvalidSpec,
    /// A backup of the cluster failed
    BackupFailed,
    /// The cluster's engine has no backup method for the request
    BackupNotSupported,
    /// Another writer changed the object concurrently
    Conflict,
}

impl ErrorType {
    /// Event reason for this error type
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Fatal => "Fatal",
            ErrorType::NotFound => "NotFound",
            ErrorType::InvalidSpec => "InvalidSpec",
            ErrorType::BackupFailed => "BackupFailed",
            ErrorType::BackupNotSupported => "BackupNotSupported",
            ErrorType::Conflict => "Conflict",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ControllerError {
    /// Deferred work: ask to be reconciled again after `after`
    pub fn requeue(after: Duration, reason: impl Into<String>) -> Self {
        ControllerError::Requeue {
            after,
            reason: reason.into(),
        }
    }

    /// Classified reconcile failure
    pub fn reconcile(error_type: ErrorType, message: impl Into<String>) -> Self {
        ControllerError::Reconcile {
            error_type,
            message: message.into(),
        }
    }

    /// The classification of a `Reconcile` error
    pub fn error_type(&self) -> Option<ErrorType> {
        match self {
            ControllerError::Reconcile { error_type, .. } => Some(*error_type),
            _ => None,
        }
    }

    /// True for deferred work
    pub fn is_requeue(&self) -> bool {
        matches!(self, ControllerError::Requeue { .. })
    }
}

fn source_chain<'a>(
    err: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(err), |&e| e.source())
}

/// True if a `ControllerError::Requeue` appears anywhere in `err`'s source chain
pub fn is_deferred(err: &(dyn StdError + 'static)) -> bool {
    source_chain(err)
        .filter_map(|e| e.downcast_ref::<ControllerError>())
        .any(ControllerError::is_requeue)
}

/// The first `ControllerError` carrying an `ErrorType` in `err`'s source chain
pub fn unwrap_controller_error<'a>(
    err: &'a (dyn StdError + 'static),
) -> Option<&'a ControllerError> {
    source_chain(err)
        .filter_map(|e| e.downcast_ref::<ControllerError>())
        .find(|e| e.error_type().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("while scaling component: {source}")]
    struct Wrapped {
        #[source]
        source: ControllerError,
    }

    #[test]
    fn test_requeue_is_deferred() {
        let err = ControllerError::requeue(Duration::from_secs(5), "waiting for pods");
        assert!(is_deferred(&err));
        assert!(unwrap_controller_error(&err).is_none());
    }

    #[test]
    fn test_wrapped_requeue_is_deferred() {
        let err = Wrapped {
            source: ControllerError::requeue(Duration::from_secs(5), "waiting for pods"),
        };
        assert!(is_deferred(&err));

        let err = anyhow::Error::new(ControllerError::requeue(Duration::from_secs(1), "later"))
            .context("reconciling pg-main");
        let err: &(dyn StdError + 'static) = err.as_ref();
        assert!(is_deferred(err));
    }

    #[test]
    fn test_unwrap_finds_typed_error() {
        let err = Wrapped {
            source: ControllerError::reconcile(ErrorType::BackupFailed, "backup pg-main-1 failed"),
        };
        assert!(!is_deferred(&err));

        let found = unwrap_controller_error(&err).unwrap();
        assert_eq!(found.error_type(), Some(ErrorType::BackupFailed));
        assert_eq!(found.to_string(), "backup pg-main-1 failed");
    }

    #[test]
    fn test_error_type_reasons() {
        assert_eq!(ErrorType::BackupNotSupported.as_str(), "BackupNotSupported");
        assert_eq!(ErrorType::NotFound.to_string(), "NotFound");
        assert!(ControllerError::requeue(Duration::ZERO, "now").is_requeue());
        assert!(!ControllerError::reconcile(ErrorType::Fatal, "boom").is_requeue());
    }

    #[test]
    fn test_untyped_errors_have_no_type() {
        let err = ControllerError::UnregisteredKind("Widget".to_string());
        assert!(!is_deferred(&err));
        assert!(unwrap_controller_error(&err).is_none());

        let io = std::io::Error::other("boom");
        assert!(unwrap_controller_error(&io).is_none());
    }
}
