//! Topology storage in a cluster ConfigMap.
//!
//! The remote-config document lives next to the deployment it describes,
//! as a single data key in one ConfigMap. Persisting applies the whole
//! manifest; there is no merge or patch path.

use serde_json::json;
use tracing::debug;

use ledgerops_state::{RemoteTopology, StateError, StateResult, TopologyStore};

use crate::kubectl::run_kubectl;

/// Data key holding the serialized document.
const DATA_KEY: &str = "topology.json";

/// ConfigMap-backed storage for the topology document.
#[derive(Debug, Clone)]
pub struct ConfigMapStore {
    kubectl: String,
    kube_context: String,
    namespace: String,
    name: String,
}

impl ConfigMapStore {
    pub fn new(kube_context: &str, namespace: &str, name: &str) -> Self {
        Self {
            kubectl: "kubectl".to_string(),
            kube_context: kube_context.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}

impl TopologyStore for ConfigMapStore {
    async fn load(&self) -> StateResult<RemoteTopology> {
        let stdout = run_kubectl(
            &self.kubectl,
            &[
                "get",
                "configmap",
                &self.name,
                "--context",
                &self.kube_context,
                "-n",
                &self.namespace,
                "-o",
                "json",
            ],
            None,
        )
        .await
        .map_err(|e| StateError::Storage(e.to_string()))?;

        let manifest: serde_json::Value =
            serde_json::from_slice(&stdout).map_err(StateError::Deserialize)?;
        let document = manifest["data"][DATA_KEY].as_str().ok_or_else(|| {
            StateError::Storage(format!(
                "configmap {}/{} has no {DATA_KEY} key",
                self.namespace, self.name
            ))
        })?;
        RemoteTopology::from_json(document)
    }

    async fn persist(&self, topology: &RemoteTopology) -> StateResult<()> {
        let manifest = json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": { "name": self.name, "namespace": self.namespace },
            "data": { DATA_KEY: topology.to_json()? },
        });
        let body = serde_json::to_vec(&manifest).map_err(StateError::Serialize)?;

        run_kubectl(
            &self.kubectl,
            &["apply", "--context", &self.kube_context, "-f", "-"],
            Some(&body),
        )
        .await
        .map_err(|e| StateError::Storage(e.to_string()))?;

        debug!(
            namespace = %self.namespace,
            name = %self.name,
            "topology document persisted to configmap"
        );
        Ok(())
    }
}
