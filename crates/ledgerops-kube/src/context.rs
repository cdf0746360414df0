//! Resolution of logical cluster references to access contexts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{KubeError, KubeResult};

/// Concrete access context for one cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterContext {
    /// The logical cluster reference this context was resolved from.
    pub cluster: String,
    /// kubeconfig context name used for API calls.
    pub kube_context: String,
}

/// Maps logical cluster references to concrete contexts.
pub trait ClusterRefResolver: Send + Sync {
    fn resolve(&self, cluster: &str) -> KubeResult<ClusterContext>;
}

/// Resolver backed by a static reference→context table, typically read
/// from the CLI configuration file.
#[derive(Debug, Clone, Default)]
pub struct ContextMap {
    entries: BTreeMap<String, String>,
}

impl ContextMap {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn insert(&mut self, cluster: &str, kube_context: &str) {
        self.entries
            .insert(cluster.to_string(), kube_context.to_string());
    }
}

impl ClusterRefResolver for ContextMap {
    fn resolve(&self, cluster: &str) -> KubeResult<ClusterContext> {
        let kube_context = self
            .entries
            .get(cluster)
            .ok_or_else(|| KubeError::UnknownCluster(cluster.to_string()))?;
        Ok(ClusterContext {
            cluster: cluster.to_string(),
            kube_context: kube_context.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_reference() {
        let mut map = ContextMap::default();
        map.insert("east", "kind-east");

        let ctx = map.resolve("east").unwrap();
        assert_eq!(ctx.cluster, "east");
        assert_eq!(ctx.kube_context, "kind-east");
    }

    #[test]
    fn unknown_reference_is_an_error() {
        let map = ContextMap::default();
        let err = map.resolve("nowhere").unwrap_err();
        assert!(err.to_string().contains("nowhere"));
    }
}
