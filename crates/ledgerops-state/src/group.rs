//! Ordered, id-keyed collections of component records.
//!
//! The persisted document stores each kind as an array; in memory a
//! group is a `BTreeMap` keyed by component id. That keeps the "unique
//! id per kind" invariant structural and makes iteration ordered by id,
//! instead of relying on array positions lining up with ids.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{StateError, StateResult};
use crate::types::{Component, ComponentId};

/// All records of one component kind, keyed by id.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentGroup<C: Component> {
    entries: BTreeMap<ComponentId, C>,
}

impl<C: Component> ComponentGroup<C> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn get(&self, id: ComponentId) -> Option<&C> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: ComponentId) -> Option<&mut C> {
        self.entries.get_mut(&id)
    }

    /// Insert a record under its own id.
    ///
    /// Fails without modifying the group when the id is already taken.
    pub fn insert(&mut self, component: C) -> StateResult<()> {
        let id = component.id();
        if self.entries.contains_key(&id) {
            return Err(StateError::ComponentExists { kind: C::KIND, id });
        }
        self.entries.insert(id, component);
        Ok(())
    }

    /// Remove and return the record with the given id.
    pub fn remove(&mut self, id: ComponentId) -> StateResult<C> {
        self.entries
            .remove(&id)
            .ok_or(StateError::ComponentNotFound { kind: C::KIND, id })
    }

    /// The next free id: one past the highest present, 0 when empty.
    ///
    /// This is a computation, not a reservation; nothing is held until
    /// a record with the id is actually inserted.
    pub fn next_id(&self) -> ComponentId {
        self.entries
            .keys()
            .next_back()
            .map(|max| max + 1)
            .unwrap_or(0)
    }

    /// Records in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &C> {
        self.entries.values()
    }

    /// Records whose metadata points at the given cluster reference.
    pub fn by_cluster(&self, cluster: &str) -> Vec<&C> {
        self.entries
            .values()
            .filter(|c| c.metadata().cluster == cluster)
            .collect()
    }
}

impl<C: Component> Default for ComponentGroup<C> {
    fn default() -> Self {
        Self::new()
    }
}

// The document shape is an array per kind; the map is an in-memory view.
impl<C: Component> Serialize for ComponentGroup<C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.values())
    }
}

impl<'de, C: Component> Deserialize<'de> for ComponentGroup<C> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let records = Vec::<C>::deserialize(deserializer)?;
        let mut group = Self::new();
        for record in records {
            let id = record.id();
            group.insert(record).map_err(|_| {
                D::Error::custom(format!("duplicate {} id {id} in document", C::KIND))
            })?;
        }
        Ok(group)
    }
}
