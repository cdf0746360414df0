//! Error types for reconciliation and port-forward lifecycle.

use thiserror::Error;

use ledgerops_kube::KubeError;
use ledgerops_state::{ComponentId, ComponentKind, StateError};

/// Result type alias for remote-config operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors raised while reconciling declared state against the cluster.
///
/// `ComponentMissing` is a consistency error: the caller decides whether
/// to rerun the command. Everything else propagates from the state model
/// or the access layer unchanged.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("{kind} id {id} has no running pod in namespace {namespace} on cluster {cluster}")]
    ComponentMissing {
        kind: ComponentKind,
        id: ComponentId,
        namespace: String,
        cluster: String,
    },

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Kube(#[from] KubeError),

    #[error("validation task failed: {0}")]
    Check(String),
}
