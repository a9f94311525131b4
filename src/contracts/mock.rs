//! In-memory chain used by the driver tests.

use super::{ChainGateway, GatewayError, RegistrationReceipt, RegistrationRequest, TxConfirmation};
use crate::chains::ChainSlug;
use crate::params::{update_digest, ParameterKind, SignedParameterUpdate, SubmissionRoute};
use crate::remote_link::RemoteLinkKind;
use alloy_primitives::{Address, Signature, B256, U256};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct MockState {
    tx_count: u64,
    registrations: Vec<(Address, RegistrationRequest)>,
    attesters: HashSet<(Address, Address, ChainSlug)>,
    pointers: HashMap<(Address, RemoteLinkKind), Address>,
    parameters: HashMap<(Address, ParameterKind, ChainSlug), U256>,
    nonces: HashMap<(Address, Address), U256>,
    nonce_reads: Vec<U256>,
    submitted: Vec<(SubmissionRoute, SignedParameterUpdate)>,
    failing_siblings: HashMap<ChainSlug, GatewayError>,
    read_failure: Option<GatewayError>,
    write_failure: Option<GatewayError>,
    revert_parameter_updates: bool,
    omit_events: bool,
}

impl MockState {
    fn next_tx(&mut self) -> B256 {
        self.tx_count += 1;
        B256::left_padding_from(&self.tx_count.to_be_bytes())
    }

    fn check_read(&self) -> Result<(), GatewayError> {
        self.read_failure.clone().map_or(Ok(()), Err)
    }

    fn check_write(&self) -> Result<(), GatewayError> {
        self.write_failure.clone().map_or(Ok(()), Err)
    }
}

/// Records every transaction; registry contracts enforce nonces and signatures
/// the way the deployed ones do.
#[derive(Debug)]
pub(crate) struct MockGateway {
    chain: ChainSlug,
    state: Mutex<MockState>,
}

impl MockGateway {
    pub(crate) fn new(chain: ChainSlug) -> Self {
        Self {
            chain,
            state: Mutex::default(),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    // -- failure injection --

    pub(crate) fn fail_registration_for(&self, sibling: ChainSlug, err: GatewayError) {
        self.state().failing_siblings.insert(sibling, err);
    }

    pub(crate) fn fail_reads(&self, err: GatewayError) {
        self.state().read_failure = Some(err);
    }

    pub(crate) fn fail_writes(&self, err: GatewayError) {
        self.state().write_failure = Some(err);
    }

    pub(crate) fn revert_parameter_updates(&self, revert: bool) {
        self.state().revert_parameter_updates = revert;
    }

    pub(crate) fn omit_events(&self) {
        self.state().omit_events = true;
    }

    // -- state setup and inspection --

    pub(crate) fn tx_count(&self) -> u64 {
        self.state().tx_count
    }

    pub(crate) fn registrations(&self) -> Vec<(Address, RegistrationRequest)> {
        self.state().registrations.clone()
    }

    pub(crate) fn has_attester(
        &self,
        switchboard: Address,
        attester: Address,
        sibling: ChainSlug,
    ) -> bool {
        self.state().attesters.contains(&(switchboard, attester, sibling))
    }

    pub(crate) fn set_pointer(&self, switchboard: Address, kind: RemoteLinkKind, remote: Address) {
        self.state().pointers.insert((switchboard, kind), remote);
    }

    pub(crate) fn pointer(&self, switchboard: Address, kind: RemoteLinkKind) -> Address {
        self.state().pointers.get(&(switchboard, kind)).copied().unwrap_or_default()
    }

    pub(crate) fn set_parameter(
        &self,
        registry: Address,
        kind: ParameterKind,
        dst: ChainSlug,
        value: U256,
    ) {
        self.state().parameters.insert((registry, kind, dst), value);
    }

    pub(crate) fn parameter(&self, registry: Address, kind: ParameterKind, dst: ChainSlug) -> U256 {
        self.state().parameters.get(&(registry, kind, dst)).copied().unwrap_or_default()
    }

    pub(crate) fn set_nonce(&self, registry: Address, signer: Address, nonce: U256) {
        self.state().nonces.insert((registry, signer), nonce);
    }

    pub(crate) fn nonce(&self, registry: Address, signer: Address) -> U256 {
        self.state().nonces.get(&(registry, signer)).copied().unwrap_or_default()
    }

    pub(crate) fn nonce_reads(&self) -> Vec<U256> {
        self.state().nonce_reads.clone()
    }

    pub(crate) fn submitted_updates(&self) -> Vec<(SubmissionRoute, SignedParameterUpdate)> {
        self.state().submitted.clone()
    }
}

#[async_trait]
impl ChainGateway for MockGateway {
    fn chain(&self) -> ChainSlug {
        self.chain
    }

    async fn register_switchboard(
        &self,
        socket: Address,
        request: &RegistrationRequest,
    ) -> Result<RegistrationReceipt, GatewayError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.check_write()?;
        if let Some(err) = state.failing_siblings.get(&request.sibling) {
            return Err(err.clone());
        }
        state.registrations.push((socket, *request));
        let tx_hash = state.next_tx();
        let index = state.registrations.len() as u64;
        let (capacitor, decapacitor) = if state.omit_events {
            (None, None)
        } else {
            (
                Some(Address::left_padding_from(&[0xca, index as u8])),
                Some(Address::left_padding_from(&[0xdc, index as u8])),
            )
        };
        Ok(RegistrationReceipt {
            tx_hash,
            capacitor,
            decapacitor,
        })
    }

    async fn is_attester(
        &self,
        switchboard: Address,
        attester: Address,
        sibling: ChainSlug,
    ) -> Result<bool, GatewayError> {
        let state = self.state();
        state.check_read()?;
        Ok(state.attesters.contains(&(switchboard, attester, sibling)))
    }

    async fn grant_attester(
        &self,
        switchboard: Address,
        sibling: ChainSlug,
        attester: Address,
    ) -> Result<TxConfirmation, GatewayError> {
        let mut state = self.state();
        state.check_write()?;
        state.attesters.insert((switchboard, attester, sibling));
        Ok(TxConfirmation { tx_hash: state.next_tx() })
    }

    async fn remote_pointer(
        &self,
        switchboard: Address,
        kind: RemoteLinkKind,
    ) -> Result<Address, GatewayError> {
        let state = self.state();
        state.check_read()?;
        Ok(state.pointers.get(&(switchboard, kind)).copied().unwrap_or_default())
    }

    async fn set_remote_pointer(
        &self,
        switchboard: Address,
        kind: RemoteLinkKind,
        remote: Address,
    ) -> Result<TxConfirmation, GatewayError> {
        let mut state = self.state();
        state.check_write()?;
        let current = state.pointers.get(&(switchboard, kind)).copied().unwrap_or_default();
        if kind.is_write_once() && !current.is_zero() {
            return Err(GatewayError::Rejected("execution reverted: TunnelAlreadySet".into()));
        }
        state.pointers.insert((switchboard, kind), remote);
        Ok(TxConfirmation { tx_hash: state.next_tx() })
    }

    async fn parameter_value(
        &self,
        registry: Address,
        kind: ParameterKind,
        dst: ChainSlug,
    ) -> Result<U256, GatewayError> {
        let state = self.state();
        state.check_read()?;
        Ok(state.parameters.get(&(registry, kind, dst)).copied().unwrap_or_default())
    }

    async fn next_nonce(&self, registry: Address, signer: Address) -> Result<U256, GatewayError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.check_read()?;
        let nonce = state.nonces.get(&(registry, signer)).copied().unwrap_or_default();
        state.nonce_reads.push(nonce);
        Ok(nonce)
    }

    async fn submit_parameter_update(
        &self,
        route: SubmissionRoute,
        update: &SignedParameterUpdate,
    ) -> Result<TxConfirmation, GatewayError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        state.check_write()?;

        let digest = update_digest(&update.message);
        let signer = Signature::try_from(update.signature.as_ref())
            .and_then(|sig| sig.recover_address_from_msg(digest.as_slice()))
            .map_err(|_| GatewayError::Rejected("execution reverted: InvalidSignature".into()))?;
        let expected = state.nonces.get(&(update.registry, signer)).copied().unwrap_or_default();
        if update.message.nonce != expected {
            return Err(GatewayError::Rejected("execution reverted: InvalidNonce".into()));
        }

        state.submitted.push((route, update.clone()));
        let tx_hash = state.next_tx();
        if state.revert_parameter_updates {
            return Err(GatewayError::Reverted { tx_hash });
        }
        state.nonces.insert((update.registry, signer), expected + U256::from(1));
        state
            .parameters
            .insert(
                (update.registry, update.message.kind, update.message.dst),
                update.message.value,
            );
        Ok(TxConfirmation { tx_hash })
    }
}
