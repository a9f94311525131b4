use crate::contracts::GatewayError;
use crate::signer::SignerError;
use thiserror::Error;

/// Failures of a signed parameter update.
#[derive(Debug, Error)]
pub enum ParameterError {
    /// Reading, submitting or confirming against the registry failed
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The operator key could not produce a signature
    #[error("signing parameter update: {0}")]
    Signer(#[from] SignerError),
}

impl ParameterError {
    /// Whether retrying the update may succeed without any state change.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Gateway(err) => err.is_transient(),
            Self::Signer(_) => false,
        }
    }
}
