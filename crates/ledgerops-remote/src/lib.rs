//! ledgerops-remote — remote-config reconciliation for LedgerOps.
//!
//! Two operations over the persisted topology document:
//!
//! - [`validator::validate_topology`] cross-checks the declared
//!   components against live cluster state (read-only).
//! - [`forward::ensure_forward`] exposes a component's pod port locally,
//!   reusing recorded bindings and persisting new ones.
//!
//! Both assume the caller serializes access to the document; see
//! `ledgerops_state::TopologyStore`.

pub mod compat;
pub mod error;
pub mod forward;
pub mod validator;

pub use compat::{CompatFlags, compat_flags};
pub use error::{RemoteError, RemoteResult};
pub use forward::{ForwardRequest, ensure_forward};
pub use validator::{ValidateOptions, validate_topology};
