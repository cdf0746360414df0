//! The persisted remote-config document and its storage backends.
//!
//! The topology document is the sole unit of persistence: every mutation
//! is followed by a full-document [`TopologyStore::persist`]. There is no
//! version stamp or compare-and-swap; callers are expected to hold an
//! external mutual-exclusion lease for the duration of any
//! read-modify-persist cycle.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use semver::Version;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::store::ComponentsStore;
use crate::types::DeploymentPhase;

/// Tool versions recorded in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionTable {
    /// Version of the CLI that last wrote the document.
    pub cli: Version,
}

/// The declared deployment: component topology plus top-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTopology {
    pub versions: VersionTable,
    /// Overall ledger lifecycle phase.
    pub phase: DeploymentPhase,
    pub components: ComponentsStore,
}

impl RemoteTopology {
    /// A fresh document as written by `init`.
    pub fn new(cli_version: Version) -> Self {
        Self {
            versions: VersionTable { cli: cli_version },
            phase: DeploymentPhase::Requested,
            components: ComponentsStore::new(),
        }
    }

    pub fn to_json(&self) -> StateResult<String> {
        serde_json::to_string_pretty(self).map_err(StateError::Serialize)
    }

    pub fn from_json(json: &str) -> StateResult<Self> {
        serde_json::from_str(json).map_err(StateError::Deserialize)
    }
}

// ── Storage ───────────────────────────────────────────────────────

/// Durable storage for the topology document.
///
/// Implementations write the entire document on every persist; there is
/// no partial or incremental write path.
pub trait TopologyStore: Send + Sync {
    fn load(&self) -> impl Future<Output = StateResult<RemoteTopology>> + Send;

    fn persist(&self, topology: &RemoteTopology) -> impl Future<Output = StateResult<()>> + Send;
}

/// Ephemeral in-memory storage, for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<RemoteTopology>>,
    persist_count: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(topology: RemoteTopology) -> Self {
        Self {
            document: Mutex::new(Some(topology)),
            persist_count: AtomicUsize::new(0),
        }
    }

    /// How many times `persist` has been called.
    pub fn persist_count(&self) -> usize {
        self.persist_count.load(Ordering::SeqCst)
    }
}

impl TopologyStore for MemoryStore {
    async fn load(&self) -> StateResult<RemoteTopology> {
        self.document
            .lock()
            .expect("memory store poisoned")
            .clone()
            .ok_or_else(|| StateError::Storage("no document stored".to_string()))
    }

    async fn persist(&self, topology: &RemoteTopology) -> StateResult<()> {
        *self.document.lock().expect("memory store poisoned") = Some(topology.clone());
        self.persist_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Local JSON-file storage.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl TopologyStore for FileStore {
    async fn load(&self) -> StateResult<RemoteTopology> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| StateError::Storage(format!("read {}: {e}", self.path.display())))?;
        RemoteTopology::from_json(&json)
    }

    async fn persist(&self, topology: &RemoteTopology) -> StateResult<()> {
        let json = topology.to_json()?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| StateError::Storage(format!("write {}: {e}", self.path.display())))?;
        debug!(path = %self.path.display(), "topology document persisted");
        Ok(())
    }
}
