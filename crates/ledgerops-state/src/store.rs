//! ComponentsStore — typed CRUD over the seven component groups.
//!
//! Every operation resolves to exactly one backing group. Typed lookups
//! (`get`, `get_by_cluster`, `add_new`) dispatch statically through
//! [`StoreSlot`]; kind-parameterized operations (`remove`, `next_id`,
//! `get_by_id`) dispatch through an exhaustive match, so a new kind
//! cannot be added without wiring every operation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::group::ComponentGroup;
use crate::types::*;

/// The declared component topology: one ordered group per kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentsStore {
    consensus_nodes: ComponentGroup<ConsensusNode>,
    block_nodes: ComponentGroup<BlockNode>,
    mirror_nodes: ComponentGroup<MirrorNode>,
    relay_nodes: ComponentGroup<RelayNodes>,
    ha_proxies: ComponentGroup<HaProxy>,
    envoy_proxies: ComponentGroup<EnvoyProxy>,
    explorers: ComponentGroup<Explorer>,
}

/// Maps a record type to its backing group inside the store.
pub trait StoreSlot: Component {
    fn group(store: &ComponentsStore) -> &ComponentGroup<Self>;
    fn group_mut(store: &mut ComponentsStore) -> &mut ComponentGroup<Self>;
}

macro_rules! impl_store_slot {
    ($ty:ident => $field:ident) => {
        impl StoreSlot for $ty {
            fn group(store: &ComponentsStore) -> &ComponentGroup<Self> {
                &store.$field
            }

            fn group_mut(store: &mut ComponentsStore) -> &mut ComponentGroup<Self> {
                &mut store.$field
            }
        }
    };
}

impl_store_slot!(ConsensusNode => consensus_nodes);
impl_store_slot!(BlockNode => block_nodes);
impl_store_slot!(MirrorNode => mirror_nodes);
impl_store_slot!(RelayNodes => relay_nodes);
impl_store_slot!(HaProxy => ha_proxies);
impl_store_slot!(EnvoyProxy => envoy_proxies);
impl_store_slot!(Explorer => explorers);

/// Dispatch a kind to its backing group, immutably.
macro_rules! with_group {
    ($store:expr, $kind:expr, $group:ident => $body:expr) => {
        match $kind {
            ComponentKind::ConsensusNode => {
                let $group = &$store.consensus_nodes;
                $body
            }
            ComponentKind::BlockNode => {
                let $group = &$store.block_nodes;
                $body
            }
            ComponentKind::MirrorNode => {
                let $group = &$store.mirror_nodes;
                $body
            }
            ComponentKind::RelayNodes => {
                let $group = &$store.relay_nodes;
                $body
            }
            ComponentKind::HaProxy => {
                let $group = &$store.ha_proxies;
                $body
            }
            ComponentKind::EnvoyProxy => {
                let $group = &$store.envoy_proxies;
                $body
            }
            ComponentKind::Explorer => {
                let $group = &$store.explorers;
                $body
            }
        }
    };
}

impl ComponentsStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Mutations ──────────────────────────────────────────────────

    /// Insert a freshly constructed record into its kind's group.
    ///
    /// Fails with [`StateError::ComponentExists`] when a record with the
    /// same id is already present; the group is left unchanged.
    pub fn add_new<C: StoreSlot>(&mut self, component: C) -> StateResult<()> {
        let id = component.id();
        C::group_mut(self).insert(component)?;
        debug!(kind = %C::KIND, id, "component added");
        Ok(())
    }

    /// Move a consensus node to a new lifecycle phase.
    ///
    /// Phase transitions are a consensus-node concern only; every other
    /// kind keeps the phase it was created with until removal.
    pub fn change_phase(&mut self, id: ComponentId, phase: DeploymentPhase) -> StateResult<()> {
        let node = self
            .consensus_nodes
            .get_mut(id)
            .ok_or(StateError::ComponentNotFound {
                kind: ComponentKind::ConsensusNode,
                id,
            })?;
        node.metadata_mut().phase = phase;
        debug!(id, ?phase, "consensus node phase changed");
        Ok(())
    }

    /// Remove the record with the given id from a kind's group.
    pub fn remove(&mut self, kind: ComponentKind, id: ComponentId) -> StateResult<()> {
        match kind {
            ComponentKind::ConsensusNode => {
                self.consensus_nodes.remove(id)?;
            }
            ComponentKind::BlockNode => {
                self.block_nodes.remove(id)?;
            }
            ComponentKind::MirrorNode => {
                self.mirror_nodes.remove(id)?;
            }
            ComponentKind::RelayNodes => {
                self.relay_nodes.remove(id)?;
            }
            ComponentKind::HaProxy => {
                self.ha_proxies.remove(id)?;
            }
            ComponentKind::EnvoyProxy => {
                self.envoy_proxies.remove(id)?;
            }
            ComponentKind::Explorer => {
                self.explorers.remove(id)?;
            }
        }
        debug!(kind = %kind, id, "component removed");
        Ok(())
    }

    /// Mutable metadata access for a component resolved by kind and id.
    pub fn metadata_mut_by_id(
        &mut self,
        kind: ComponentKind,
        id: ComponentId,
    ) -> Option<&mut ComponentMetadata> {
        match kind {
            ComponentKind::ConsensusNode => {
                self.consensus_nodes.get_mut(id).map(Component::metadata_mut)
            }
            ComponentKind::BlockNode => self.block_nodes.get_mut(id).map(Component::metadata_mut),
            ComponentKind::MirrorNode => self.mirror_nodes.get_mut(id).map(Component::metadata_mut),
            ComponentKind::RelayNodes => self.relay_nodes.get_mut(id).map(Component::metadata_mut),
            ComponentKind::HaProxy => self.ha_proxies.get_mut(id).map(Component::metadata_mut),
            ComponentKind::EnvoyProxy => {
                self.envoy_proxies.get_mut(id).map(Component::metadata_mut)
            }
            ComponentKind::Explorer => self.explorers.get_mut(id).map(Component::metadata_mut),
        }
    }

    // ── Lookups ────────────────────────────────────────────────────

    /// Typed exact-match lookup by id.
    pub fn get<C: StoreSlot>(&self, id: ComponentId) -> StateResult<&C> {
        C::group(self)
            .get(id)
            .ok_or(StateError::ComponentNotFound { kind: C::KIND, id })
    }

    /// All records of a kind placed on the given cluster.
    ///
    /// An empty result is not an error.
    pub fn get_by_cluster<C: StoreSlot>(&self, cluster: &str) -> Vec<&C> {
        C::group(self).by_cluster(cluster)
    }

    /// Kind-dispatched metadata lookup.
    ///
    /// This is the dynamic entry point: callers that hold a kind at
    /// runtime rather than a record type go through here. Use [`get`]
    /// when the record type is known statically.
    ///
    /// [`get`]: ComponentsStore::get
    pub fn get_by_id(&self, kind: ComponentKind, id: ComponentId) -> StateResult<&ComponentMetadata> {
        with_group!(self, kind, group => group
            .iter()
            .map(|c| c.metadata())
            .find(|m| m.id == id)
            .ok_or(StateError::ComponentNotFound { kind, id }))
    }

    /// The next free id for a kind: one past the highest present id, or
    /// 0 when the group is empty. Not a reservation.
    pub fn next_id(&self, kind: ComponentKind) -> ComponentId {
        with_group!(self, kind, group => group.next_id())
    }

    /// Whether a record with the given id exists in a kind's group.
    pub fn contains(&self, kind: ComponentKind, id: ComponentId) -> bool {
        with_group!(self, kind, group => group.contains(id))
    }

    /// Number of records in a kind's group.
    pub fn count(&self, kind: ComponentKind) -> usize {
        with_group!(self, kind, group => group.len())
    }

    /// Metadata of every record of a kind, in ascending id order.
    pub fn metadata_of(&self, kind: ComponentKind) -> Vec<&ComponentMetadata> {
        with_group!(self, kind, group => group.iter().map(|c| c.metadata()).collect())
    }

    /// Resolve a component of a kind by its cluster reference.
    ///
    /// Returns the lowest-id match when several records share a cluster.
    pub fn find_id_by_cluster(&self, kind: ComponentKind, cluster: &str) -> Option<ComponentId> {
        with_group!(self, kind, group => group
            .iter()
            .map(|c| c.metadata())
            .find(|m| m.cluster == cluster)
            .map(|m| m.id))
    }
}
