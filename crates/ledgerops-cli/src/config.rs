//! Local CLI configuration (`ledgerops.toml`).
//!
//! The config file carries everything that is deliberately *not* in the
//! topology document: the cluster-reference table, the default
//! namespace, and where the document itself lives.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use ledgerops_kube::{ConfigMapStore, ContextMap};
use ledgerops_state::FileStore;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Default namespace for new components.
    pub namespace: String,
    /// Where the topology document is stored.
    pub topology: TopologyLocation,
    /// Logical cluster reference → kubeconfig context.
    pub clusters: BTreeMap<String, String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            namespace: "ledger".to_string(),
            topology: TopologyLocation::File {
                path: PathBuf::from("topology.json"),
            },
            clusters: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum TopologyLocation {
    /// Local JSON file, mostly for development.
    File { path: PathBuf },
    /// ConfigMap in one of the clusters.
    ConfigMap {
        context: String,
        namespace: String,
        name: String,
    },
}

/// A concrete storage backend built from the configured location.
pub enum StorageBackend {
    File(FileStore),
    ConfigMap(ConfigMapStore),
}

impl CliConfig {
    /// Read the config file; a missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn resolver(&self) -> ContextMap {
        ContextMap::new(self.clusters.clone())
    }

    pub fn storage(&self) -> StorageBackend {
        match &self.topology {
            TopologyLocation::File { path } => StorageBackend::File(FileStore::new(path.clone())),
            TopologyLocation::ConfigMap {
                context,
                namespace,
                name,
            } => StorageBackend::ConfigMap(ConfigMapStore::new(context, namespace, name)),
        }
    }
}
