//! End-to-end reconciliation flow over an in-memory topology document:
//! provision, validate, phase change, forward, revalidate.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use semver::Version;

use ledgerops_kube::{ClusterAccess, ClusterContext, ContextMap, KubeResult, Pod, PodRef};
use ledgerops_remote::{ForwardRequest, ValidateOptions, ensure_forward, validate_topology};
use ledgerops_state::{
    ComponentKind, DeploymentPhase, MemoryStore, RemoteTopology, TopologyStore, factory,
};

/// Serves a fixed (namespace, selector) → pod table and a fixed bound
/// port for forwards.
#[derive(Clone, Default)]
struct FakeCluster {
    pods: Arc<HashMap<(String, String), usize>>,
    forwards: Arc<Mutex<usize>>,
}

impl FakeCluster {
    fn with_pods(entries: &[(&str, &str, usize)]) -> Self {
        Self {
            pods: Arc::new(
                entries
                    .iter()
                    .map(|(ns, sel, n)| ((ns.to_string(), sel.to_string()), *n))
                    .collect(),
            ),
            forwards: Arc::default(),
        }
    }

    fn forward_count(&self) -> usize {
        *self.forwards.lock().unwrap()
    }
}

impl ClusterAccess for FakeCluster {
    async fn list_pods(
        &self,
        _ctx: &ClusterContext,
        namespace: &str,
        selector: &str,
    ) -> KubeResult<Vec<Pod>> {
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
        pod_port: u16,
        _persistent: bool,
        _reuse: bool,
    ) -> KubeResult<u16> {
        *self.forwards.lock().unwrap() += 1;
        // Bind one above the pod port so reuse is observable.
        Ok(pod_port + 1)
    }
}

fn resolver() -> ContextMap {
    let mut map = ContextMap::default();
    map.insert("east", "kind-east");
    map
}

fn provisioned_topology() -> RemoteTopology {
    let mut topology = RemoteTopology::new(Version::new(0, 42, 0));
    for node in factory::consensus_nodes_from_ordinals(&[1, 2], "east", "ledger", None) {
        topology.components.add_new(node).unwrap();
    }
    let proxy = factory::new_ha_proxy(&topology.components, "east", "ledger");
    topology.components.add_new(proxy).unwrap();
    topology
}

const HAPROXY_SELECTOR: &str = "app.kubernetes.io/name=haproxy,ledgerops.io/id=0";
const CONSENSUS_0_SELECTOR: &str = "app.kubernetes.io/name=consensus-node,ledgerops.io/id=0";
const CONSENSUS_1_SELECTOR: &str = "app.kubernetes.io/name=consensus-node,ledgerops.io/id=1";

#[tokio::test]
async fn requested_nodes_validate_before_any_pod_exists() {
    let topology = provisioned_topology();
    let cluster = FakeCluster::with_pods(&[("ledger", HAPROXY_SELECTOR, 1)]);

    validate_topology(&topology, &resolver(), &cluster, ValidateOptions::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn started_node_without_pod_fails_validation() {
    let mut topology = provisioned_topology();
    topology
        .components
        .change_phase(0, DeploymentPhase::Started)
        .unwrap();

    let cluster = FakeCluster::with_pods(&[("ledger", HAPROXY_SELECTOR, 1)]);
    let err = validate_topology(&topology, &resolver(), &cluster, ValidateOptions::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("ConsensusNode id 0"));
}

#[tokio::test]
async fn full_deploy_forward_revalidate_cycle() {
    let mut topology = provisioned_topology();
    let storage = MemoryStore::new();

    // Both nodes come up.
    topology
        .components
        .change_phase(0, DeploymentPhase::Started)
        .unwrap();
    topology
        .components
        .change_phase(1, DeploymentPhase::Started)
        .unwrap();
    storage.persist(&topology).await.unwrap();

    let cluster = FakeCluster::with_pods(&[
        ("ledger", HAPROXY_SELECTOR, 1),
        ("ledger", CONSENSUS_0_SELECTOR, 1),
        ("ledger", CONSENSUS_1_SELECTOR, 1),
    ]);

    validate_topology(&topology, &resolver(), &cluster, ValidateOptions::default())
        .await
        .unwrap();

    // Expose node 0's gRPC port, twice; the second call reuses.
    let request = ForwardRequest {
        kind: ComponentKind::ConsensusNode,
        pod: PodRef::new("ledger", "consensus-node-0"),
        pod_port: 50211,
        local_port: 50211,
        cluster: None,
        node_id: Some(0),
        label: "grpc".to_string(),
        reuse: false,
    };
    let bound = ensure_forward(&mut topology, &storage, &cluster, request.clone())
        .await
        .unwrap();
    let again = ensure_forward(&mut topology, &storage, &cluster, request)
        .await
        .unwrap();

    assert_eq!(bound, 50212);
    assert_eq!(again, bound);
    assert_eq!(cluster.forward_count(), 1);

    // The stored document reflects the binding and still validates.
    let reloaded = storage.load().await.unwrap();
    let metadata = reloaded
        .components
        .get_by_id(ComponentKind::ConsensusNode, 0)
        .unwrap();
    assert_eq!(metadata.port_forward_configs.len(), 1);

    validate_topology(&reloaded, &resolver(), &cluster, ValidateOptions::default())
        .await
        .unwrap();
}
