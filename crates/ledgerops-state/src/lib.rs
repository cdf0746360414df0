//! ledgerops-state — declared-topology state model for LedgerOps.
//!
//! Models the remote-config document that describes a ledger deployment:
//! seven kinds of components, each in an ordered id-keyed group, plus the
//! top-level version and phase metadata. The [`ComponentsStore`] owns
//! identity allocation and group invariants; [`factory`] builds new
//! records with the right identity strategy per kind; [`schema`] defines
//! the persisted document and its storage backends.
//!
//! The document is persisted whole on every mutation. Concurrency
//! control is the caller's obligation; see [`schema::TopologyStore`].

pub mod error;
pub mod factory;
pub mod group;
pub mod schema;
pub mod store;
pub mod types;

pub use error::{StateError, StateResult};
pub use group::ComponentGroup;
pub use schema::{FileStore, MemoryStore, RemoteTopology, TopologyStore, VersionTable};
pub use store::{ComponentsStore, StoreSlot};
pub use types::*;
