//! Delivery errors
//!
//! These never reach `emit` callers; they are logged by the delivery task.

use kube_store::StoreError;
use thiserror::Error;

/// Why an event was not delivered
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// No store client could be constructed; no attempt was made
    #[error("Failed to connect to event store: {0}")]
    Connect(#[source] StoreError),

    /// Every create attempt failed
    #[error("Event not delivered after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: StoreError,
    },
}
