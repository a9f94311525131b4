use crate::chains::ChainSlug;
use alloy_primitives::{Address, Signature};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::errors::SignerError;

/// Holds operator keys and decides which one signs for a chain.
///
/// The first key added becomes the operator. Keys never leave the manager except
/// as a cloned [`PrivateKeySigner`] handed to a transaction wallet.
#[derive(Debug, Default)]
pub struct SignerManager {
    /// Map of address to signer
    signers: RwLock<HashMap<Address, PrivateKeySigner>>,
    /// Operator signing on every chain
    default_operator: RwLock<Option<Address>>,
}

impl SignerManager {
    /// Create an empty signer manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a signer from a private key hex string
    pub async fn add_signer_from_hex(&self, private_key_hex: &str) -> Result<Address, SignerError> {
        let signer = private_key_hex
            .trim()
            .parse::<PrivateKeySigner>()
            .map_err(|_| SignerError::InvalidPrivateKey)?;

        Ok(self.add_signer(signer).await)
    }

    /// Add a signer directly
    pub async fn add_signer(&self, signer: PrivateKeySigner) -> Address {
        let address = signer.address();
        self.signers.write().await.insert(address, signer);
        self.default_operator.write().await.get_or_insert(address);
        address
    }

    /// Operator address signing for `chain`.
    pub async fn operator_for(&self, chain: ChainSlug) -> Result<Address, SignerError> {
        self.default_operator.read().await.ok_or(SignerError::NoOperatorForChain(chain))
    }

    /// Clone of the key for `address`, used to build a transaction wallet.
    pub async fn signer(&self, address: &Address) -> Result<PrivateKeySigner, SignerError> {
        self.signers
            .read()
            .await
            .get(address)
            .cloned()
            .ok_or(SignerError::NoSignerForAddress(*address))
    }

    /// EIP-191 personal-message signature over `message`.
    pub async fn sign_message(
        &self,
        address: &Address,
        message: &[u8],
    ) -> Result<Signature, SignerError> {
        let signers = self.signers.read().await;
        let signer =
            signers.get(address).ok_or_else(|| SignerError::NoSignerForAddress(*address))?;

        signer
            .sign_message(message)
            .await
            .map_err(|e| SignerError::SigningFailed(e.to_string()))
    }
}
