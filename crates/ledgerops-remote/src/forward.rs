//! Port-forward lifecycle: reuse recorded bindings, record new ones.
//!
//! A forward request resolves to a component record, checks for an
//! existing binding on the requested pod port, and only then opens a new
//! forward and persists the updated document. Components without a
//! record (legacy documents) still get a forward, just untracked.

use tracing::{debug, info, warn};

use ledgerops_kube::{ClusterAccess, PodRef};
use ledgerops_state::{
    ClusterReference, ComponentId, ComponentKind, PortForwardConfig, RemoteTopology, StateError,
    TopologyStore,
};

use crate::compat::compat_flags;
use crate::error::RemoteResult;

/// A request to expose a component's pod port locally.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub kind: ComponentKind,
    pub pod: PodRef,
    pub pod_port: u16,
    /// Requested local port; the access layer may bind a different one.
    pub local_port: u16,
    /// Resolve the target component by cluster reference...
    pub cluster: Option<ClusterReference>,
    /// ...or, failing that, by component id.
    pub node_id: Option<ComponentId>,
    /// What this forward is for, used in log output.
    pub label: String,
    pub reuse: bool,
}

/// Ensure a local port forwards to the component's pod port.
///
/// Returns the bound local port. When the component already records a
/// binding for `pod_port`, that binding's local port is returned and no
/// new forward is opened. Otherwise the new binding is appended to the
/// component and the whole document is persisted.
///
/// Not safe to call concurrently for the same component without external
/// serialization; the document has no internal concurrency control.
pub async fn ensure_forward<A, S>(
    topology: &mut RemoteTopology,
    storage: &S,
    access: &A,
    req: ForwardRequest,
) -> RemoteResult<u16>
where
    A: ClusterAccess,
    S: TopologyStore,
{
    let mut reuse = req.reuse;
    if compat_flags(&topology.versions.cli).force_forward_reuse {
        debug!(version = %topology.versions.cli, "legacy document, forcing forward reuse");
        reuse = true;
    }

    // Resolve the target component within the kind's group.
    let target = match (req.cluster.as_deref(), req.node_id) {
        (Some(cluster), _) => topology.components.find_id_by_cluster(req.kind, cluster),
        (None, Some(id)) if topology.components.contains(req.kind, id) => Some(id),
        _ => None,
    };

    let Some(id) = target else {
        // Legacy documents may hold no record for this component;
        // forward without tracking rather than failing.
        warn!(kind = %req.kind, label = %req.label, "no component record, forwarding untracked");
        let bound = access
            .port_forward(&req.pod, req.local_port, req.pod_port, true, true)
            .await?;
        return Ok(bound);
    };

    let recorded = topology
        .components
        .get_by_id(req.kind, id)
        .ok()
        .and_then(|m| m.forward_for_pod_port(req.pod_port))
        .map(|c| c.local_port);
    if let Some(local_port) = recorded {
        debug!(kind = %req.kind, id, local_port, pod_port = req.pod_port, "reusing recorded binding");
        return Ok(local_port);
    }

    let bound = access
        .port_forward(&req.pod, req.local_port, req.pod_port, true, reuse)
        .await?;

    let metadata = topology
        .components
        .metadata_mut_by_id(req.kind, id)
        .ok_or(StateError::ComponentNotFound { kind: req.kind, id })?;
    metadata.port_forward_configs.push(PortForwardConfig {
        local_port: bound,
        pod_port: req.pod_port,
    });
    storage.persist(topology).await?;

    info!(
        kind = %req.kind,
        id,
        local_port = bound,
        pod_port = req.pod_port,
        label = %req.label,
        "port-forward established"
    );
    Ok(bound)
}
