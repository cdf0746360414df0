//! Label selectors identifying each component's pods.
//!
//! Pure templating: a component's kind and id map to the selector its
//! pods are labeled with at deploy time. Reconciliation asks the cluster
//! for pods matching this selector to decide whether the component is
//! actually running.

use ledgerops_state::{ComponentId, ComponentKind};

/// Label carrying the component id.
const ID_LABEL: &str = "ledgerops.io/id";
/// Standard app-name label set by the deployment charts.
const APP_LABEL: &str = "app.kubernetes.io/name";

/// The label selector for one component's pods.
pub fn selector(kind: ComponentKind, id: ComponentId) -> String {
    format!("{APP_LABEL}={},{ID_LABEL}={id}", app_name(kind))
}

fn app_name(kind: ComponentKind) -> &'static str {
    match kind {
        ComponentKind::ConsensusNode => "consensus-node",
        ComponentKind::BlockNode => "block-node",
        ComponentKind::MirrorNode => "mirror-node",
        ComponentKind::RelayNodes => "relay",
        ComponentKind::HaProxy => "haproxy",
        ComponentKind::EnvoyProxy => "envoy-proxy",
        ComponentKind::Explorer => "explorer",
    }
}
