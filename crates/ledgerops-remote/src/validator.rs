//! Reconciliation of the declared topology against live cluster state.
//!
//! A validation pass confirms that every component expected to be
//! running has at least one pod matching its label selector. The pass is
//! read-only: it never mutates or persists the document.

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::debug;

use ledgerops_kube::{ClusterAccess, ClusterContext, ClusterRefResolver, labels};
use ledgerops_state::{ComponentId, ComponentKind, DeploymentPhase, RemoteTopology};

use crate::error::{RemoteError, RemoteResult};

/// Options for a validation pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateOptions {
    /// Leave consensus nodes out of the pass entirely, e.g. while the
    /// ledger is still being provisioned.
    pub skip_consensus_nodes: bool,
}

/// Whether a record is exempt from the live-pod check.
///
/// Only consensus nodes carry a skip rule: in phases that expect no
/// live pod, no cluster query is issued at all.
fn skip_check(kind: ComponentKind, phase: DeploymentPhase) -> bool {
    match kind {
        ComponentKind::ConsensusNode => !phase.expects_live_pod(),
        ComponentKind::BlockNode
        | ComponentKind::MirrorNode
        | ComponentKind::RelayNodes
        | ComponentKind::HaProxy
        | ComponentKind::EnvoyProxy
        | ComponentKind::Explorer => false,
    }
}

/// One pending live-pod check.
struct Check {
    kind: ComponentKind,
    id: ComponentId,
    namespace: String,
    cluster: String,
    ctx: ClusterContext,
    selector: String,
}

/// Validate the declared topology against the live clusters.
///
/// Per-component checks run as independently spawned tasks with no
/// ordering among them. The pass succeeds only if every check succeeds;
/// on failure it returns the first error in completion order. In-flight
/// checks are not aborted; they run to completion and their results are
/// discarded.
pub async fn validate_topology<A, R>(
    topology: &RemoteTopology,
    resolver: &R,
    access: &A,
    options: ValidateOptions,
) -> RemoteResult<()>
where
    A: ClusterAccess,
    R: ClusterRefResolver,
{
    let mut checks = Vec::new();
    for kind in ComponentKind::ALL {
        if kind == ComponentKind::ConsensusNode && options.skip_consensus_nodes {
            continue;
        }
        for metadata in topology.components.metadata_of(kind) {
            if skip_check(kind, metadata.phase) {
                debug!(%kind, id = metadata.id, phase = ?metadata.phase, "live-pod check skipped");
                continue;
            }
            let ctx = resolver.resolve(&metadata.cluster)?;
            checks.push(Check {
                kind,
                id: metadata.id,
                namespace: metadata.namespace.clone(),
                cluster: metadata.cluster.clone(),
                ctx,
                selector: labels::selector(kind, metadata.id),
            });
        }
    }

    debug!(count = checks.len(), "issuing live-pod checks");

    let mut pending: FuturesUnordered<_> = checks
        .into_iter()
        .map(|check| {
            let access = access.clone();
            tokio::spawn(async move { check_component(access, check).await })
        })
        .collect();

    // Returning on the first failure drops the remaining join handles,
    // which detaches those tasks rather than cancelling them.
    while let Some(joined) = pending.next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(e) => return Err(RemoteError::Check(e.to_string())),
        }
    }
    Ok(())
}

async fn check_component<A: ClusterAccess>(access: A, check: Check) -> RemoteResult<()> {
    let pods = access
        .list_pods(&check.ctx, &check.namespace, &check.selector)
        .await?;
    if pods.is_empty() {
        return Err(RemoteError::ComponentMissing {
            kind: check.kind,
            id: check.id,
            namespace: check.namespace,
            cluster: check.cluster,
        });
    }
    debug!(kind = %check.kind, id = check.id, pods = pods.len(), "component observed live");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use ledgerops_kube::{ContextMap, KubeResult, Pod, PodRef};
    use ledgerops_state::{
        ComponentMetadata, ComponentsStore, ConsensusNode, HaProxy, RemoteTopology,
    };
    use semver::Version;

    /// Cluster stub serving a fixed (namespace, selector) → pod-count
    /// table and recording every selector it was queried with.
    #[derive(Clone, Default)]
    struct MockCluster {
        pods: Arc<HashMap<(String, String), usize>>,
        queries: Arc<Mutex<Vec<String>>>,
    }

    impl MockCluster {
        fn with_pods(entries: &[(&str, &str, usize)]) -> Self {
            let pods = entries
                .iter()
                .map(|(ns, sel, n)| ((ns.to_string(), sel.to_string()), *n))
                .collect();
            Self {
                pods: Arc::new(pods),
                queries: Arc::default(),
            }
        }

        fn queried_selectors(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    impl ClusterAccess for MockCluster {
        async fn list_pods(
            &self,
            _ctx: &ClusterContext,
            namespace: &str,
            selector: &str,
        ) -> KubeResult<Vec<Pod>> {
            self.queries.lock().unwrap().push(selector.to_string());
            let count = self
                .pods
                .get(&(namespace.to_string(), selector.to_string()))
                .copied()
                .unwrap_or(0);
            Ok((0..count)
                .map(|i| Pod {
                    name: format!("pod-{i}"),
                    namespace: namespace.to_string(),
                    phase: "Running".to_string(),
                })
                .collect())
        }

        async fn port_forward(
            &self,
            _pod: &PodRef,
            _local_port: u16,
            _pod_port: u16,
            _persistent: bool,
            _reuse: bool,
        ) -> KubeResult<u16> {
            unreachable!("validator never forwards ports")
        }
    }

    fn resolver() -> ContextMap {
        let mut map = ContextMap::default();
        map.insert("cluster", "kind-cluster");
        map
    }

    fn consensus(id: u32, phase: DeploymentPhase) -> ConsensusNode {
        ConsensusNode::new(
            ComponentMetadata::new(id, "cluster", "ledger", phase),
            Vec::new(),
        )
    }

    fn topology_with(components: ComponentsStore) -> RemoteTopology {
        let mut topology = RemoteTopology::new(Version::new(0, 42, 0));
        topology.components = components;
        topology
    }

    #[tokio::test]
    async fn requested_consensus_node_is_not_queried() {
        let mut components = ComponentsStore::new();
        components
            .add_new(consensus(0, DeploymentPhase::Requested))
            .unwrap();
        let topology = topology_with(components);

        let cluster = MockCluster::default();
        validate_topology(&topology, &resolver(), &cluster, ValidateOptions::default())
            .await
            .unwrap();

        assert!(cluster.queried_selectors().is_empty());
    }

    #[tokio::test]
    async fn stopped_consensus_node_is_not_queried() {
        let mut components = ComponentsStore::new();
        components
            .add_new(consensus(1, DeploymentPhase::Stopped))
            .unwrap();
        let topology = topology_with(components);

        let cluster = MockCluster::default();
        validate_topology(&topology, &resolver(), &cluster, ValidateOptions::default())
            .await
            .unwrap();

        assert!(cluster.queried_selectors().is_empty());
    }

    #[tokio::test]
    async fn missing_ha_proxy_names_component_fully() {
        let mut components = ComponentsStore::new();
        components
            .add_new(HaProxy::new(ComponentMetadata::new(
                2,
                "cluster",
                "ledger",
                DeploymentPhase::Deployed,
            )))
            .unwrap();
        let topology = topology_with(components);

        let err = validate_topology(
            &topology,
            &resolver(),
            &MockCluster::default(),
            ValidateOptions::default(),
        )
        .await
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("HaProxy"));
        assert!(message.contains("id 2"));
        assert!(message.contains("ledger"));
        assert!(message.contains("cluster"));
    }

    #[tokio::test]
    async fn live_components_pass() {
        let mut components = ComponentsStore::new();
        components
            .add_new(consensus(0, DeploymentPhase::Started))
            .unwrap();
        components
            .add_new(HaProxy::new(ComponentMetadata::new(
                0,
                "cluster",
                "ledger",
                DeploymentPhase::Deployed,
            )))
            .unwrap();
        let topology = topology_with(components);

        let cluster = MockCluster::with_pods(&[
            (
                "ledger",
                "app.kubernetes.io/name=consensus-node,ledgerops.io/id=0",
                1,
            ),
            ("ledger", "app.kubernetes.io/name=haproxy,ledgerops.io/id=0", 2),
        ]);

        validate_topology(&topology, &resolver(), &cluster, ValidateOptions::default())
            .await
            .unwrap();
        assert_eq!(cluster.queried_selectors().len(), 2);
    }

    #[tokio::test]
    async fn skip_consensus_option_leaves_them_unchecked() {
        let mut components = ComponentsStore::new();
        components
            .add_new(consensus(0, DeploymentPhase::Deployed))
            .unwrap();
        let topology = topology_with(components);

        // No pods anywhere, but consensus checks are skipped wholesale.
        validate_topology(
            &topology,
            &resolver(),
            &MockCluster::default(),
            ValidateOptions {
                skip_consensus_nodes: true,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn unknown_cluster_reference_fails_resolution() {
        let mut components = ComponentsStore::new();
        // The record points at a cluster the resolver has no entry for.
        components
            .add_new(HaProxy::new(ComponentMetadata::new(
                0,
                "unmapped",
                "ledger",
                DeploymentPhase::Deployed,
            )))
            .unwrap();
        let topology = topology_with(components);

        let err = validate_topology(
            &topology,
            &resolver(),
            &MockCluster::default(),
            ValidateOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("unknown cluster reference"));
    }
}
