//! Parameter Updater
//!
//! Propose gas limit, attest gas limit and execution overhead are stored per
//! destination chain in registry contracts that only accept updates signed by
//! an authorized operator. Each update is bound to the registry's per-signer
//! nonce:
//!
//! ```text
//! digest    = keccak256(abi.encode(tag, src, dst, nonce, value))
//! signature = personal_sign(digest)
//! registry.setX(nonce, dst, value, signature)
//! ```
//!
//! The registry re-derives the digest, checks the nonce and recovers the signer,
//! so a reused or skipped nonce is rejected on-chain. Updates for one
//! (chain, signer) nonce domain are therefore strictly serialized: the next
//! update's nonce fetch only happens after the previous submission is confirmed.

pub mod errors;

pub use errors::ParameterError;

use crate::chains::ChainSlug;
use crate::constants::roles;
use crate::contracts::{ChainGateway, TxConfirmation};
use crate::ledger::ChainRecord;
use crate::report::StepStatus;
use crate::signer::SignerManager;
use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_sol_types::SolValue;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// A signed, nonce-protected parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Gas limit for packet proposals, on the transmit manager
    ProposeGasLimit,
    /// Gas limit for attestations, on the fast switchboard
    AttestGasLimit,
    /// Execution overhead, on the fast and optimistic switchboards
    ExecutionOverhead,
}

impl ParameterKind {
    pub const ALL: [ParameterKind; 3] =
        [Self::ProposeGasLimit, Self::AttestGasLimit, Self::ExecutionOverhead];

    /// Domain tag hashed into the update digest.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::ProposeGasLimit => "PROPOSE_GAS_LIMIT_UPDATE",
            Self::AttestGasLimit => "ATTEST_GAS_LIMIT_UPDATE",
            Self::ExecutionOverhead => "EXECUTION_OVERHEAD_UPDATE",
        }
    }

    /// Contract roles holding this parameter.
    pub fn registry_roles(&self) -> &'static [&'static str] {
        match self {
            Self::ProposeGasLimit => &[roles::TRANSMIT_MANAGER],
            Self::AttestGasLimit => &[roles::FAST_SWITCHBOARD],
            Self::ExecutionOverhead => &[roles::FAST_SWITCHBOARD, roles::OPTIMISTIC_SWITCHBOARD],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProposeGasLimit => "proposeGasLimit",
            Self::AttestGasLimit => "attestGasLimit",
            Self::ExecutionOverhead => "executionOverhead",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fields bound by an update signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterUpdateMessage {
    pub kind: ParameterKind,
    /// Chain hosting the registry
    pub src: ChainSlug,
    /// Destination the value applies to
    pub dst: ChainSlug,
    /// Registry nonce of the signer at signing time
    pub nonce: U256,
    pub value: U256,
}

/// ABI parameter encoding of
/// `(string tag, uint256 src, uint256 dst, uint256 nonce, uint256 value)`.
pub fn encode_update(message: &ParameterUpdateMessage) -> Vec<u8> {
    (
        message.kind.tag().to_string(),
        U256::from(message.src.get()),
        U256::from(message.dst.get()),
        message.nonce,
        message.value,
    )
        .abi_encode_params()
}

/// Digest the operator signs for `message`.
pub fn update_digest(message: &ParameterUpdateMessage) -> B256 {
    keccak256(encode_update(message))
}

/// An update ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedParameterUpdate {
    /// Registry contract the update targets
    pub registry: Address,
    pub message: ParameterUpdateMessage,
    /// 65-byte `r || s || v` personal-message signature
    pub signature: Bytes,
}

/// Where a signed update is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionRoute {
    /// Straight to the registry contract
    Direct,
    /// Through the chain's socket batcher, as a single-request batch
    Batcher(Address),
}

impl SubmissionRoute {
    /// Batcher route when the chain has a recorded batcher.
    pub fn for_record(record: &ChainRecord) -> Self {
        record
            .contract(roles::SOCKET_BATCHER)
            .map_or(Self::Direct, Self::Batcher)
    }
}

/// One parameter to converge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterTarget {
    pub kind: ParameterKind,
    /// Registry contract holding the parameter
    pub registry: Address,
    pub route: SubmissionRoute,
}

/// Runs signed parameter updates, serializing each (chain, signer) nonce domain.
#[derive(Debug, Clone)]
pub struct ParameterUpdater {
    signers: Arc<SignerManager>,
    #[allow(clippy::type_complexity)]
    nonce_locks: Arc<DashMap<(ChainSlug, Address), Arc<Mutex<()>>>>,
}

impl ParameterUpdater {
    pub fn new(signers: Arc<SignerManager>) -> Self {
        Self {
            signers,
            nonce_locks: Arc::default(),
        }
    }

    /// Converge `target` towards `dst` on the gateway's chain to `value`.
    ///
    /// Skips when the registry already holds `value`. Otherwise fetches the
    /// signer's nonce, signs, submits and waits for a successful receipt.
    pub async fn update_parameter(
        &self,
        gateway: &dyn ChainGateway,
        target: ParameterTarget,
        dst: ChainSlug,
        value: U256,
    ) -> StepStatus {
        let chain = gateway.chain();
        match self.try_update(gateway, target, dst, value).await {
            Ok(Some(confirmation)) => {
                info!(
                    %chain, sibling = %dst, kind = %target.kind, %value,
                    tx_hash = %confirmation.tx_hash,
                    "Parameter updated"
                );
                StepStatus::Applied { tx_hash: confirmation.tx_hash }
            }
            Ok(None) => {
                info!(
                    %chain, sibling = %dst, kind = %target.kind, %value,
                    "Parameter already set, skipping"
                );
                StepStatus::skipped(format!("{} already {value}", target.kind))
            }
            Err(err) => {
                warn!(
                    %chain, sibling = %dst, kind = %target.kind, error = %err,
                    "Parameter update failed"
                );
                StepStatus::Failed {
                    error: err.to_string(),
                    transient: err.is_transient(),
                }
            }
        }
    }

    async fn try_update(
        &self,
        gateway: &dyn ChainGateway,
        target: ParameterTarget,
        dst: ChainSlug,
        value: U256,
    ) -> Result<Option<TxConfirmation>, ParameterError> {
        let chain = gateway.chain();
        let operator = self.signers.operator_for(chain).await?;

        // Clone the `Arc` out so the dashmap shard is not held across awaits.
        let domain = {
            let entry = self.nonce_locks.entry((chain, operator)).or_default();
            Arc::clone(entry.value())
        };
        let _guard = domain.lock().await;

        let current = gateway.parameter_value(target.registry, target.kind, dst).await?;
        if current == value {
            return Ok(None);
        }

        let nonce = gateway.next_nonce(target.registry, operator).await?;
        let message = ParameterUpdateMessage {
            kind: target.kind,
            src: chain,
            dst,
            nonce,
            value,
        };
        let digest = update_digest(&message);
        let signature = self.signers.sign_message(&operator, digest.as_slice()).await?;
        debug!(
            %chain, sibling = %dst, kind = %target.kind, %nonce, %digest,
            "Signed parameter update"
        );

        let update = SignedParameterUpdate {
            registry: target.registry,
            message,
            signature: Bytes::from(signature.as_bytes().to_vec()),
        };
        let confirmation = gateway.submit_parameter_update(target.route, &update).await?;
        Ok(Some(confirmation))
    }
}
