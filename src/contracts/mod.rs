//! Contract collaborators
//!
//! The socket, switchboards, transmit manager and batcher are external: they are
//! only invoked through the entry points declared in [`bindings`]. Everything the
//! drivers need from a chain goes through the [`ChainGateway`] trait so the driver
//! logic can be exercised against an in-memory chain.
//!
//! In production: implemented by [`RpcGateway`] (alloy provider + local wallet)
//! In tests: implemented by `mock::MockGateway`

pub mod bindings;
pub mod errors;
#[cfg(test)]
pub(crate) mod mock;
pub mod rpc;

pub use errors::GatewayError;
pub use rpc::RpcGateway;

use crate::chains::ChainSlug;
use crate::params::{ParameterKind, SignedParameterUpdate, SubmissionRoute};
use crate::remote_link::RemoteLinkKind;
use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Arguments of a socket switchboard registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationRequest {
    /// Switchboard to register
    pub switchboard: Address,
    /// Sibling chain it will govern
    pub sibling: ChainSlug,
    /// Capacitor type to deploy
    pub capacitor_type: u32,
    /// Maximum messages per packet
    pub max_packet_length: u32,
}

/// A confirmed, successful registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationReceipt {
    /// Mined transaction
    pub tx_hash: B256,
    /// Capacitor created by the socket, when the event was found
    pub capacitor: Option<Address>,
    /// Decapacitor created by the socket, when the event was found
    pub decapacitor: Option<Address>,
}

/// A confirmed transaction whose receipt reports success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxConfirmation {
    /// Mined transaction
    pub tx_hash: B256,
}

/// Contract calls against one chain.
///
/// Write methods return only after the transaction is mined *and* its receipt
/// reports success; a mined-but-reverted transaction is [`GatewayError::Reverted`].
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Chain this gateway talks to.
    fn chain(&self) -> ChainSlug;

    /// `socket.registerSwitchBoard(..)`.
    async fn register_switchboard(
        &self,
        socket: Address,
        request: &RegistrationRequest,
    ) -> Result<RegistrationReceipt, GatewayError>;

    /// `fastSwitchboard.isAttester(attester, sibling)`.
    async fn is_attester(
        &self,
        switchboard: Address,
        attester: Address,
        sibling: ChainSlug,
    ) -> Result<bool, GatewayError>;

    /// `fastSwitchboard.grantAttesterRole(sibling, attester)`.
    async fn grant_attester(
        &self,
        switchboard: Address,
        sibling: ChainSlug,
        attester: Address,
    ) -> Result<TxConfirmation, GatewayError>;

    /// Current remote pointer of a native switchboard (zero when unset).
    async fn remote_pointer(
        &self,
        switchboard: Address,
        kind: RemoteLinkKind,
    ) -> Result<Address, GatewayError>;

    /// Point a native switchboard at its counterpart.
    async fn set_remote_pointer(
        &self,
        switchboard: Address,
        kind: RemoteLinkKind,
        remote: Address,
    ) -> Result<TxConfirmation, GatewayError>;

    /// Value currently configured for `kind` towards `dst` on `registry`.
    async fn parameter_value(
        &self,
        registry: Address,
        kind: ParameterKind,
        dst: ChainSlug,
    ) -> Result<U256, GatewayError>;

    /// `registry.nextNonce(signer)`.
    async fn next_nonce(&self, registry: Address, signer: Address) -> Result<U256, GatewayError>;

    /// Submit a signed parameter update.
    async fn submit_parameter_update(
        &self,
        route: SubmissionRoute,
        update: &SignedParameterUpdate,
    ) -> Result<TxConfirmation, GatewayError>;
}

/// Gateways keyed by chain.
pub type Gateways = HashMap<ChainSlug, Arc<dyn ChainGateway>>;
