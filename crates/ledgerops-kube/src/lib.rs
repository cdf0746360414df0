//! ledgerops-kube — cluster access for LedgerOps.
//!
//! Defines the seams the state engine reconciles through: cluster
//! reference resolution ([`context`]), the pod model ([`pod`]), the
//! [`ClusterAccess`] trait, and the pure label templates ([`labels`]).
//! Ships two process-backed implementations: [`KubectlCluster`] for pod
//! listing and port-forwarding, and [`ConfigMapStore`] for keeping the
//! topology document in the cluster it describes.

pub mod access;
pub mod configmap;
pub mod context;
pub mod error;
pub mod kubectl;
pub mod labels;
pub mod pod;

pub use access::ClusterAccess;
pub use configmap::ConfigMapStore;
pub use context::{ClusterContext, ClusterRefResolver, ContextMap};
pub use error::{KubeError, KubeResult};
pub use kubectl::KubectlCluster;
pub use pod::{Pod, PodRef};
