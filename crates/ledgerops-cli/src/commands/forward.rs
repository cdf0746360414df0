//! `lops forward` — expose a component's pod port locally.

use clap::Args;

use ledgerops_kube::{KubectlCluster, PodRef};
use ledgerops_remote::{ForwardRequest, ensure_forward};
use ledgerops_state::TopologyStore;

use crate::commands::KindArg;
use crate::config::{CliConfig, StorageBackend};

#[derive(Debug, Args)]
pub struct ForwardArgs {
    kind: KindArg,
    /// Target pod name.
    #[arg(long)]
    pod: String,
    /// Port on the pod to forward to.
    #[arg(long)]
    pod_port: u16,
    /// Requested local port; 0 lets the OS choose.
    #[arg(long, default_value_t = 0)]
    local_port: u16,
    /// Resolve the component by cluster reference...
    #[arg(long)]
    cluster: Option<String>,
    /// ...or by component id.
    #[arg(long)]
    id: Option<u32>,
    /// Namespace of the pod (defaults to the configured namespace).
    #[arg(long)]
    namespace: Option<String>,
    /// What this forward is for; shows up in logs.
    #[arg(long, default_value = "manual")]
    label: String,
    /// Do not accept an existing OS-level forward on the local port.
    #[arg(long)]
    no_reuse: bool,
}

pub async fn run(config: &CliConfig, args: ForwardArgs) -> anyhow::Result<()> {
    match config.storage() {
        StorageBackend::File(store) => forward(config, &store, args).await,
        StorageBackend::ConfigMap(store) => forward(config, &store, args).await,
    }
}

async fn forward<S: TopologyStore>(
    config: &CliConfig,
    storage: &S,
    args: ForwardArgs,
) -> anyhow::Result<()> {
    let mut topology = storage.load().await?;
    let namespace = args.namespace.as_deref().unwrap_or(&config.namespace);

    let request = ForwardRequest {
        kind: args.kind.into(),
        pod: PodRef::new(namespace, &args.pod),
        pod_port: args.pod_port,
        local_port: args.local_port,
        cluster: args.cluster,
        node_id: args.id,
        label: args.label,
        reuse: !args.no_reuse,
    };

    let bound = ensure_forward(&mut topology, storage, &KubectlCluster::new(), request).await?;
    println!("forwarding 127.0.0.1:{bound} -> {}:{}", args.pod, args.pod_port);
    Ok(())
}
