//! The cluster access seam.

use std::future::Future;

use crate::context::ClusterContext;
use crate::error::KubeResult;
use crate::pod::{Pod, PodRef};

/// Asynchronous access to Kubernetes clusters.
///
/// Implementations own all timeout and retry behavior; callers treat
/// every method as a single fallible network operation. The trait is
/// `Clone` so reconciliation can fan checks out across spawned tasks.
pub trait ClusterAccess: Clone + Send + Sync + 'static {
    /// List pods matching a label selector in a namespace.
    fn list_pods(
        &self,
        ctx: &ClusterContext,
        namespace: &str,
        selector: &str,
    ) -> impl Future<Output = KubeResult<Vec<Pod>>> + Send;

    /// Ensure a local port forwards to `pod_port` on the given pod.
    ///
    /// Returns the actually bound local port, which may differ from the
    /// requested one. With `reuse`, an existing OS-level forward on the
    /// requested port is accepted as-is.
    fn port_forward(
        &self,
        pod: &PodRef,
        local_port: u16,
        pod_port: u16,
        persistent: bool,
        reuse: bool,
    ) -> impl Future<Output = KubeResult<u16>> + Send;
}
