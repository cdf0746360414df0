//! Domain types for the declared network topology.
//!
//! These types mirror the persisted remote-config document: seven kinds
//! of deployed components, each carrying identity, placement, and
//! lifecycle phase. Everything serializes to the camelCase JSON shape
//! stored alongside the deployment.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical name of a target cluster. Resolved to a concrete access
/// context by `ledgerops-kube`.
pub type ClusterReference = String;

/// Identifies a component uniquely within its kind's collection.
///
/// Identity is scoped per kind: a ConsensusNode and an EnvoyProxy may
/// both carry id 0.
pub type ComponentId = u32;

/// The component id for a ledger node given its ordinal position.
///
/// Node ordinals start at 1; node #1 owns component id 0. Consensus-node
/// ids are always derived this way and never drawn from the allocator.
pub fn consensus_component_id(node_ordinal: u32) -> ComponentId {
    debug_assert!(node_ordinal >= 1, "node ordinals start at 1");
    node_ordinal - 1
}

// ── Kinds ─────────────────────────────────────────────────────────

/// The seven component kinds of a ledger deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    ConsensusNode,
    BlockNode,
    MirrorNode,
    RelayNodes,
    HaProxy,
    EnvoyProxy,
    Explorer,
}

impl ComponentKind {
    /// Every kind, in the order the document stores them.
    pub const ALL: [ComponentKind; 7] = [
        ComponentKind::ConsensusNode,
        ComponentKind::BlockNode,
        ComponentKind::MirrorNode,
        ComponentKind::RelayNodes,
        ComponentKind::HaProxy,
        ComponentKind::EnvoyProxy,
        ComponentKind::Explorer,
    ];

    /// Display name used in errors and log output.
    pub fn display_name(&self) -> &'static str {
        match self {
            ComponentKind::ConsensusNode => "ConsensusNode",
            ComponentKind::BlockNode => "BlockNode",
            ComponentKind::MirrorNode => "MirrorNode",
            ComponentKind::RelayNodes => "RelayNodes",
            ComponentKind::HaProxy => "HaProxy",
            ComponentKind::EnvoyProxy => "EnvoyProxy",
            ComponentKind::Explorer => "Explorer",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.display_name())
    }
}

// ── Phase ─────────────────────────────────────────────────────────

/// Lifecycle phase of a deployed component.
///
/// `Requested` and `Stopped` are the only phases in which a component
/// is not expected to have a live pod. `Frozen` applies to consensus
/// nodes only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentPhase {
    Requested,
    Started,
    Deployed,
    Stopped,
    Frozen,
}

impl DeploymentPhase {
    /// Whether a component in this phase should have a running pod.
    pub fn expects_live_pod(&self) -> bool {
        !matches!(self, DeploymentPhase::Requested | DeploymentPhase::Stopped)
    }
}

// ── Metadata ──────────────────────────────────────────────────────

/// A recorded local-to-pod port binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortForwardConfig {
    pub local_port: u16,
    pub pod_port: u16,
}

/// Identity, placement, and lifecycle metadata shared by every
/// component record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMetadata {
    pub id: ComponentId,
    pub namespace: String,
    pub cluster: ClusterReference,
    pub phase: DeploymentPhase,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub port_forward_configs: Vec<PortForwardConfig>,
}

impl ComponentMetadata {
    pub fn new(
        id: ComponentId,
        cluster: &str,
        namespace: &str,
        phase: DeploymentPhase,
    ) -> Self {
        Self {
            id,
            namespace: namespace.to_string(),
            cluster: cluster.to_string(),
            phase,
            port_forward_configs: Vec::new(),
        }
    }

    /// The recorded binding for a pod port, if one exists.
    pub fn forward_for_pod_port(&self, pod_port: u16) -> Option<&PortForwardConfig> {
        self.port_forward_configs
            .iter()
            .find(|c| c.pod_port == pod_port)
    }
}

// ── Records ───────────────────────────────────────────────────────

/// Behavior shared by all component records.
pub trait Component: Clone + Serialize + serde::de::DeserializeOwned {
    /// The kind whose collection this record lives in.
    const KIND: ComponentKind;

    fn metadata(&self) -> &ComponentMetadata;
    fn metadata_mut(&mut self) -> &mut ComponentMetadata;

    fn id(&self) -> ComponentId {
        self.metadata().id
    }
}

macro_rules! metadata_component {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            pub metadata: ComponentMetadata,
        }

        impl $name {
            pub fn new(metadata: ComponentMetadata) -> Self {
                Self { metadata }
            }
        }
    };
}

macro_rules! impl_component {
    ($name:ident => $kind:ident) => {
        impl Component for $name {
            const KIND: ComponentKind = ComponentKind::$kind;

            fn metadata(&self) -> &ComponentMetadata {
                &self.metadata
            }

            fn metadata_mut(&mut self) -> &mut ComponentMetadata {
                &mut self.metadata
            }
        }
    };
}

/// A consensus node of the ledger.
///
/// Consensus-node ids are caller-supplied, derived from the ledger node
/// ordinal; see [`consensus_component_id`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusNode {
    pub metadata: ComponentMetadata,
    /// Block nodes this consensus node streams to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub block_node_ids: Vec<ComponentId>,
}

impl ConsensusNode {
    pub fn new(metadata: ComponentMetadata, block_node_ids: Vec<ComponentId>) -> Self {
        Self {
            metadata,
            block_node_ids,
        }
    }
}

/// A JSON-RPC relay serving a set of consensus nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayNodes {
    pub metadata: ComponentMetadata,
    /// The consensus nodes this relay fronts.
    pub consensus_node_ids: Vec<ComponentId>,
}

impl RelayNodes {
    pub fn new(metadata: ComponentMetadata, consensus_node_ids: Vec<ComponentId>) -> Self {
        Self {
            metadata,
            consensus_node_ids,
        }
    }
}

metadata_component! {
    /// A block node receiving the block stream.
    BlockNode
}
metadata_component! {
    /// A mirror node importing the transaction record stream.
    MirrorNode
}
metadata_component! {
    /// An HAProxy fronting a consensus node's gRPC endpoint.
    HaProxy
}
metadata_component! {
    /// An Envoy proxy terminating gRPC-web traffic.
    EnvoyProxy
}
metadata_component! {
    /// A ledger explorer UI.
    Explorer
}

impl_component!(ConsensusNode => ConsensusNode);
impl_component!(BlockNode => BlockNode);
impl_component!(MirrorNode => MirrorNode);
impl_component!(RelayNodes => RelayNodes);
impl_component!(HaProxy => HaProxy);
impl_component!(EnvoyProxy => EnvoyProxy);
impl_component!(Explorer => Explorer);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consensus_ids_derive_from_ordinals() {
        assert_eq!(consensus_component_id(1), 0);
        assert_eq!(consensus_component_id(4), 3);
    }

    #[test]
    fn requested_and_stopped_expect_no_pod() {
        assert!(!DeploymentPhase::Requested.expects_live_pod());
        assert!(!DeploymentPhase::Stopped.expects_live_pod());
        assert!(DeploymentPhase::Started.expects_live_pod());
        assert!(DeploymentPhase::Deployed.expects_live_pod());
        assert!(DeploymentPhase::Frozen.expects_live_pod());
    }

    #[test]
    fn kind_display_names() {
        assert_eq!(ComponentKind::HaProxy.to_string(), "HaProxy");
        assert_eq!(ComponentKind::RelayNodes.to_string(), "RelayNodes");
    }

    #[test]
    fn metadata_serializes_camel_case() {
        let mut metadata = ComponentMetadata::new(2, "cluster-a", "ledger", DeploymentPhase::Deployed);
        metadata.port_forward_configs.push(PortForwardConfig {
            local_port: 50211,
            pod_port: 50211,
        });

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["portForwardConfigs"][0]["localPort"], 50211);
        assert_eq!(json["phase"], "deployed");
    }

    #[test]
    fn empty_forward_list_is_omitted() {
        let metadata = ComponentMetadata::new(0, "cluster-a", "ledger", DeploymentPhase::Requested);
        let json = serde_json::to_value(&metadata).unwrap();
        assert!(json.get("portForwardConfigs").is_none());
    }

    #[test]
    fn forward_lookup_matches_pod_port() {
        let mut metadata = ComponentMetadata::new(0, "cluster-a", "ledger", DeploymentPhase::Deployed);
        metadata.port_forward_configs.push(PortForwardConfig {
            local_port: 8080,
            pod_port: 5551,
        });

        assert_eq!(
            metadata.forward_for_pod_port(5551).map(|c| c.local_port),
            Some(8080)
        );
        assert!(metadata.forward_for_pod_port(5552).is_none());
    }
}
