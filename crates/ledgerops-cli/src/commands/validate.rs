//! `lops validate` — reconcile declared state against the live clusters.

use ledgerops_kube::KubectlCluster;
use ledgerops_remote::{ValidateOptions, validate_topology};
use ledgerops_state::TopologyStore;

use crate::config::{CliConfig, StorageBackend};

pub async fn run(config: &CliConfig, skip_consensus: bool) -> anyhow::Result<()> {
    match config.storage() {
        StorageBackend::File(store) => validate(config, &store, skip_consensus).await,
        StorageBackend::ConfigMap(store) => validate(config, &store, skip_consensus).await,
    }
}

async fn validate<S: TopologyStore>(
    config: &CliConfig,
    storage: &S,
    skip_consensus: bool,
) -> anyhow::Result<()> {
    let topology = storage.load().await?;
    let options = ValidateOptions {
        skip_consensus_nodes: skip_consensus,
    };

    validate_topology(
        &topology,
        &config.resolver(),
        &KubectlCluster::new(),
        options,
    )
    .await?;

    println!("declared topology matches live cluster state");
    Ok(())
}
