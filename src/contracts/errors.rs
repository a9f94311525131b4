use alloy_primitives::B256;
use thiserror::Error;

/// Failures of an external contract call, split so a caller can tell what is safe
/// to retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Connection failure, timeout or malformed RPC response. Retryable.
    #[error("RPC transport error: {0}")]
    Transport(String),

    /// The node refused the call (revert during estimation, stale nonce, bad signature).
    #[error("call rejected: {0}")]
    Rejected(String),

    /// The transaction was mined with a failure status.
    #[error("transaction {tx_hash} reverted")]
    Reverted {
        /// Mined transaction
        tx_hash: B256,
    },

    /// The transaction was submitted but not mined in time. Retryable.
    #[error("transaction {tx_hash} not confirmed in time")]
    ConfirmationTimeout {
        /// Submitted transaction
        tx_hash: B256,
    },
}

impl GatewayError {
    /// Whether retrying the same step may succeed without any state change.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::ConfirmationTimeout { .. })
    }
}
