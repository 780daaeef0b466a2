//! Object store errors

use thiserror::Error;

/// Errors that can occur when talking to the object store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Kubernetes API request failed
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// No usable client configuration (kubeconfig / in-cluster config)
    #[error("Failed to build Kubernetes client: {0}")]
    Connect(String),

    /// Store temporarily unable to serve the request
    #[error("Object store unavailable: {0}")]
    Unavailable(String),
}
