//! `lops init` — write a fresh topology document.

use semver::Version;

use ledgerops_state::{RemoteTopology, TopologyStore};

use crate::config::{CliConfig, StorageBackend};

pub async fn run(config: &CliConfig) -> anyhow::Result<()> {
    match config.storage() {
        StorageBackend::File(store) => init(&store).await,
        StorageBackend::ConfigMap(store) => init(&store).await,
    }
}

async fn init<S: TopologyStore>(storage: &S) -> anyhow::Result<()> {
    let cli_version: Version = env!("CARGO_PKG_VERSION").parse()?;
    let topology = RemoteTopology::new(cli_version);
    storage.persist(&topology).await?;
    println!("initialized empty topology document");
    Ok(())
}
