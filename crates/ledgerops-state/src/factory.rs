//! Construction rules for new component records.
//!
//! Two identity strategies coexist and stay separate on purpose. Most
//! kinds draw their id from the store's allocator and start `Deployed`.
//! Consensus nodes carry caller-supplied ids derived from the ledger
//! node ordinal ([`consensus_component_id`]) and start in a provisioning
//! phase; the allocator is never consulted for them.

use crate::store::ComponentsStore;
use crate::types::*;

/// The phases a consensus node may be created in.
///
/// Restricting the value space here makes "initial phase must be
/// REQUESTED or STARTED" a type constraint rather than a runtime check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionPhase {
    Requested,
    Started,
}

impl From<ProvisionPhase> for DeploymentPhase {
    fn from(phase: ProvisionPhase) -> Self {
        match phase {
            ProvisionPhase::Requested => DeploymentPhase::Requested,
            ProvisionPhase::Started => DeploymentPhase::Started,
        }
    }
}

fn allocated(store: &ComponentsStore, kind: ComponentKind, cluster: &str, namespace: &str) -> ComponentMetadata {
    ComponentMetadata::new(store.next_id(kind), cluster, namespace, DeploymentPhase::Deployed)
}

pub fn new_block_node(store: &ComponentsStore, cluster: &str, namespace: &str) -> BlockNode {
    BlockNode::new(allocated(store, ComponentKind::BlockNode, cluster, namespace))
}

pub fn new_mirror_node(store: &ComponentsStore, cluster: &str, namespace: &str) -> MirrorNode {
    MirrorNode::new(allocated(store, ComponentKind::MirrorNode, cluster, namespace))
}

pub fn new_relay(
    store: &ComponentsStore,
    cluster: &str,
    namespace: &str,
    consensus_node_ids: Vec<ComponentId>,
) -> RelayNodes {
    RelayNodes::new(
        allocated(store, ComponentKind::RelayNodes, cluster, namespace),
        consensus_node_ids,
    )
}

pub fn new_ha_proxy(store: &ComponentsStore, cluster: &str, namespace: &str) -> HaProxy {
    HaProxy::new(allocated(store, ComponentKind::HaProxy, cluster, namespace))
}

pub fn new_envoy_proxy(store: &ComponentsStore, cluster: &str, namespace: &str) -> EnvoyProxy {
    EnvoyProxy::new(allocated(store, ComponentKind::EnvoyProxy, cluster, namespace))
}

pub fn new_explorer(store: &ComponentsStore, cluster: &str, namespace: &str) -> Explorer {
    Explorer::new(allocated(store, ComponentKind::Explorer, cluster, namespace))
}

/// Construct a consensus node with an explicit, caller-derived id.
pub fn new_consensus_node(
    id: ComponentId,
    cluster: &str,
    namespace: &str,
    phase: ProvisionPhase,
    block_node_ids: Vec<ComponentId>,
) -> ConsensusNode {
    ConsensusNode::new(
        ComponentMetadata::new(id, cluster, namespace, phase.into()),
        block_node_ids,
    )
}

/// Bulk-construct one consensus node per ledger node ordinal.
///
/// Each record starts in `Requested` with its id derived from the
/// ordinal. Any supplied port-forward bindings are copied onto every
/// record.
pub fn consensus_nodes_from_ordinals(
    ordinals: &[u32],
    cluster: &str,
    namespace: &str,
    port_forward_configs: Option<&[PortForwardConfig]>,
) -> Vec<ConsensusNode> {
    ordinals
        .iter()
        .map(|&ordinal| {
            let mut node = new_consensus_node(
                consensus_component_id(ordinal),
                cluster,
                namespace,
                ProvisionPhase::Requested,
                Vec::new(),
            );
            if let Some(configs) = port_forward_configs {
                node.metadata.port_forward_configs = configs.to_vec();
            }
            node
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocating_constructors_start_deployed() {
        let mut store = ComponentsStore::new();
        store
            .add_new(MirrorNode::new(ComponentMetadata::new(
                0,
                "cluster",
                "ledger",
                DeploymentPhase::Deployed,
            )))
            .unwrap();

        let mirror = new_mirror_node(&store, "cluster", "ledger");
        assert_eq!(mirror.metadata.id, 1);
        assert_eq!(mirror.metadata.phase, DeploymentPhase::Deployed);

        // Allocation is per kind; a fresh kind starts at 0.
        let relay = new_relay(&store, "cluster", "ledger", vec![0]);
        assert_eq!(relay.metadata.id, 0);
        assert_eq!(relay.consensus_node_ids, vec![0]);
    }

    #[test]
    fn allocator_leaves_no_trace_without_add() {
        let store = ComponentsStore::new();
        let first = new_explorer(&store, "cluster", "ledger");
        let second = new_explorer(&store, "cluster", "ledger");

        // Two constructions without an intervening add see the same id.
        assert_eq!(first.metadata.id, second.metadata.id);
    }

    #[test]
    fn consensus_node_takes_explicit_id_and_phase() {
        let node = new_consensus_node(3, "cluster", "ledger", ProvisionPhase::Started, vec![1]);
        assert_eq!(node.metadata.id, 3);
        assert_eq!(node.metadata.phase, DeploymentPhase::Started);
        assert_eq!(node.block_node_ids, vec![1]);
    }

    #[test]
    fn bulk_construction_from_ordinals() {
        let nodes = consensus_nodes_from_ordinals(&[1, 2, 3], "cluster", "ledger", None);

        let ids: Vec<ComponentId> = nodes.iter().map(|n| n.metadata.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(nodes
            .iter()
            .all(|n| n.metadata.phase == DeploymentPhase::Requested));
    }

    #[test]
    fn bulk_construction_copies_forward_configs() {
        let configs = [PortForwardConfig {
            local_port: 50211,
            pod_port: 50211,
        }];
        let nodes = consensus_nodes_from_ordinals(&[1, 2], "cluster", "ledger", Some(&configs));

        for node in &nodes {
            assert_eq!(node.metadata.port_forward_configs, configs.to_vec());
        }
    }
}
