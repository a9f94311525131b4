use super::ChainSlug;
use thiserror::Error;

/// Errors raised while resolving chains and their network metadata
#[derive(Debug, Error)]
pub enum ChainRegistryError {
    /// The chain slug is not declared in the registry
    #[error("Chain {0} is not declared in the chain registry")]
    UnknownChain(ChainSlug),

    /// Neither an override nor the chain's RPC environment variable is set
    #[error("No RPC endpoint for chain {chain}: set {env} or pass --rpc {chain}=<url>")]
    MissingRpc {
        /// Chain without an endpoint
        chain: ChainSlug,
        /// Environment variable that was consulted
        env: String,
    },

    /// The configured RPC endpoint is not a valid URL
    #[error("Invalid RPC URL for chain {chain}: {reason}")]
    InvalidRpcUrl {
        /// Chain the URL belongs to
        chain: ChainSlug,
        /// Parser message
        reason: String,
    },

    /// A chain slug could not be parsed
    #[error("Invalid chain slug '{0}'")]
    InvalidSlug(String),
}
