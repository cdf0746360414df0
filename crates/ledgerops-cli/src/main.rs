use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod config;

use config::CliConfig;

#[derive(Parser)]
#[command(
    name = "lops",
    about = "LedgerOps — deploys and operates ledger networks on Kubernetes",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "ledgerops.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a fresh, empty topology document.
    Init,
    /// Manage declared components.
    Component {
        #[command(subcommand)]
        action: commands::component::ComponentAction,
    },
    /// Check that every declared component has a live pod.
    Validate {
        /// Leave consensus nodes out of the pass.
        #[arg(long)]
        skip_consensus: bool,
    },
    /// Expose a component's pod port on a local port.
    Forward(commands::forward::ForwardArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load(&cli.config)?;

    match cli.command {
        Commands::Init => commands::init::run(&config).await,
        Commands::Component { action } => commands::component::run(&config, action).await,
        Commands::Validate { skip_consensus } => {
            commands::validate::run(&config, skip_consensus).await
        }
        Commands::Forward(args) => commands::forward::run(&config, args).await,
    }
}
