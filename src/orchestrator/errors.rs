use crate::chains::ChainSlug;
use thiserror::Error;

/// Errors that abort a whole run before any step is taken.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A requested source chain is not in the chain registry
    #[error("chain {0} is not a known chain")]
    UnknownChain(ChainSlug),

    /// A requested source chain has no entry in the address ledger
    #[error("chain {0} has no deployment in the address ledger")]
    NotDeployed(ChainSlug),
}
