//! Command implementations.
//!
//! Each command loads the topology document through the configured
//! storage backend, calls into the state/reconciliation engine, and
//! persists on mutation. No topology logic lives here.

pub mod component;
pub mod forward;
pub mod init;
pub mod validate;

use clap::ValueEnum;

use ledgerops_state::ComponentKind;

/// Component kind as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    ConsensusNode,
    BlockNode,
    MirrorNode,
    Relay,
    Haproxy,
    EnvoyProxy,
    Explorer,
}

impl From<KindArg> for ComponentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::ConsensusNode => ComponentKind::ConsensusNode,
            KindArg::BlockNode => ComponentKind::BlockNode,
            KindArg::MirrorNode => ComponentKind::MirrorNode,
            KindArg::Relay => ComponentKind::RelayNodes,
            KindArg::Haproxy => ComponentKind::HaProxy,
            KindArg::EnvoyProxy => ComponentKind::EnvoyProxy,
            KindArg::Explorer => ComponentKind::Explorer,
        }
    }
}
