//! Cluster access error types.

use thiserror::Error;

/// Result type alias for cluster access operations.
pub type KubeResult<T> = Result<T, KubeError>;

/// Errors from the cluster access layer.
///
/// These propagate to callers unchanged; the state engine adds no
/// retry or wrapping on top.
#[derive(Debug, Error)]
pub enum KubeError {
    #[error("unknown cluster reference: {0}")]
    UnknownCluster(String),

    #[error("failed to spawn {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("kubectl exited with {status}: {stderr}")]
    Kubectl { status: String, stderr: String },

    #[error("unexpected kubectl output: {0}")]
    Output(#[source] serde_json::Error),

    #[error("port-forward to {pod} did not report a bound port")]
    ForwardNotReady { pod: String },
}
