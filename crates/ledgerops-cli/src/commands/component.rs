//! `lops component` — manage declared components.

use anyhow::bail;
use clap::{Args, Subcommand};

use ledgerops_state::{ComponentKind, TopologyStore, factory};

use crate::commands::KindArg;
use crate::config::{CliConfig, StorageBackend};

#[derive(Debug, Subcommand)]
pub enum ComponentAction {
    /// Add a component to the declared topology.
    Add(AddArgs),
    /// Remove a component from the declared topology.
    Remove { kind: KindArg, id: u32 },
    /// List declared components.
    List,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    kind: KindArg,
    /// Cluster reference the component is placed on.
    #[arg(long)]
    cluster: String,
    /// Namespace override (defaults to the configured namespace).
    #[arg(long)]
    namespace: Option<String>,
    /// Ledger node ordinals, consensus nodes only (node #1 owns id 0).
    #[arg(long = "node", value_name = "ORDINAL")]
    nodes: Vec<u32>,
    /// Consensus node ids served, relays only.
    #[arg(long = "serves", value_name = "ID")]
    serves: Vec<u32>,
}

pub async fn run(config: &CliConfig, action: ComponentAction) -> anyhow::Result<()> {
    match config.storage() {
        StorageBackend::File(store) => dispatch(config, &store, action).await,
        StorageBackend::ConfigMap(store) => dispatch(config, &store, action).await,
    }
}

async fn dispatch<S: TopologyStore>(
    config: &CliConfig,
    storage: &S,
    action: ComponentAction,
) -> anyhow::Result<()> {
    match action {
        ComponentAction::Add(args) => add(config, storage, args).await,
        ComponentAction::Remove { kind, id } => remove(storage, kind.into(), id).await,
        ComponentAction::List => list(storage).await,
    }
}

async fn add<S: TopologyStore>(config: &CliConfig, storage: &S, args: AddArgs) -> anyhow::Result<()> {
    let mut topology = storage.load().await?;
    let namespace = args.namespace.as_deref().unwrap_or(&config.namespace);
    let cluster = args.cluster.as_str();
    let components = &mut topology.components;

    match args.kind {
        KindArg::ConsensusNode => {
            if args.nodes.is_empty() {
                bail!("consensus nodes require at least one --node ordinal");
            }
            for node in
                factory::consensus_nodes_from_ordinals(&args.nodes, cluster, namespace, None)
            {
                components.add_new(node)?;
            }
        }
        KindArg::Relay => {
            if args.serves.is_empty() {
                bail!("relays require at least one --serves consensus node id");
            }
            let relay = factory::new_relay(components, cluster, namespace, args.serves.clone());
            components.add_new(relay)?;
        }
        KindArg::BlockNode => {
            let node = factory::new_block_node(components, cluster, namespace);
            components.add_new(node)?;
        }
        KindArg::MirrorNode => {
            let node = factory::new_mirror_node(components, cluster, namespace);
            components.add_new(node)?;
        }
        KindArg::Haproxy => {
            let proxy = factory::new_ha_proxy(components, cluster, namespace);
            components.add_new(proxy)?;
        }
        KindArg::EnvoyProxy => {
            let proxy = factory::new_envoy_proxy(components, cluster, namespace);
            components.add_new(proxy)?;
        }
        KindArg::Explorer => {
            let explorer = factory::new_explorer(components, cluster, namespace);
            components.add_new(explorer)?;
        }
    }

    storage.persist(&topology).await?;
    println!("added {} on {cluster}", ComponentKind::from(args.kind));
    Ok(())
}

async fn remove<S: TopologyStore>(
    storage: &S,
    kind: ComponentKind,
    id: u32,
) -> anyhow::Result<()> {
    let mut topology = storage.load().await?;
    topology.components.remove(kind, id)?;
    storage.persist(&topology).await?;
    println!("removed {kind} id {id}");
    Ok(())
}

async fn list<S: TopologyStore>(storage: &S) -> anyhow::Result<()> {
    let topology = storage.load().await?;
    for kind in ComponentKind::ALL {
        for metadata in topology.components.metadata_of(kind) {
            println!(
                "{kind:>13}  id {:<3} {}@{}  {:?}",
                metadata.id, metadata.namespace, metadata.cluster, metadata.phase
            );
        }
    }
    Ok(())
}
