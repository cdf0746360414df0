//! Error types for the topology state model.

use thiserror::Error;

use crate::types::{ComponentId, ComponentKind};

/// Result type alias for state operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors raised by the components store and topology storage.
///
/// `ComponentExists` and `ComponentNotFound` are data-integrity errors:
/// they indicate a logic or state-corruption bug and are never retried.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("component exists: {kind} id {id} is already present")]
    ComponentExists { kind: ComponentKind, id: ComponentId },

    #[error("{kind} with id {id} doesn't exist")]
    ComponentNotFound { kind: ComponentKind, id: ComponentId },

    #[error("failed to serialize topology document: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to deserialize topology document: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error("topology storage error: {0}")]
    Storage(String),
}
