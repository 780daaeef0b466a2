//! Warning events for reconcile errors
//!
//! Every reconcile error worth a human's attention becomes a `Warning` event
//! on the object being reconciled. Deferred work is not an error and is
//! skipped. The event reason is the error's `ErrorType` when it has one.

use crate::error::{is_deferred, unwrap_controller_error};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::ObjectReference;
use kube::Resource;
use kube::runtime::events::{Event, EventType, Recorder};
use std::error::Error as StdError;
use tracing::{debug, warn};

/// Event severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Normal,
    Warning,
}

/// Records events against objects
#[async_trait]
pub trait EventRecorder: Send + Sync {
    async fn record(&self, object: &ObjectReference, severity: Severity, reason: &str, message: &str);
}

#[async_trait]
impl EventRecorder for Recorder {
    async fn record(&self, object: &ObjectReference, severity: Severity, reason: &str, message: &str) {
        let type_ = match severity {
            Severity::Normal => EventType::Normal,
            Severity::Warning => EventType::Warning,
        };
        let event = Event {
            type_,
            reason: reason.to_string(),
            note: Some(message.to_string()),
            action: reason.to_string(),
            secondary: None,
        };

        if let Err(e) = self.publish(&event, object).await {
            warn!(
                "Failed to publish {} event for {}/{}: {}",
                reason,
                object.namespace.as_deref().unwrap_or_default(),
                object.name.as_deref().unwrap_or_default(),
                e
            );
        }
    }
}

/// Record a `Warning` event on `object` for `err`.
///
/// Does nothing when there is no error or the error is deferred work.
pub async fn send_warning<K>(
    recorder: &dyn EventRecorder,
    object: &K,
    default_reason: &str,
    err: Option<&(dyn StdError + Send + Sync + 'static)>,
) where
    K: Resource<DynamicType = ()> + Sync,
{
    let Some(err) = err else {
        return;
    };
    if is_deferred(err) {
        debug!("Not raising a warning for deferred work: {}", err);
        return;
    }

    let reason = unwrap_controller_error(err)
        .and_then(|e| e.error_type())
        .map_or(default_reason, |t| t.as_str());

    recorder
        .record(&object.object_ref(&()), Severity::Warning, reason, &err.to_string())
        .await;
}
