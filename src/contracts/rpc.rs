//! [`ChainGateway`] over JSON-RPC: an alloy provider with the operator wallet
//! attached, one per chain.

use super::bindings::{
    INativeSwitchboard, IPolygonL1Switchboard, IPolygonL2Switchboard, ISocket, ISocketBatcher,
    ISwitchboard, ITransmitManager,
};
use super::{ChainGateway, GatewayError, RegistrationReceipt, RegistrationRequest, TxConfirmation};
use crate::chains::ChainSlug;
use crate::params::{ParameterKind, SignedParameterUpdate, SubmissionRoute};
use crate::remote_link::RemoteLinkKind;
use alloy_network::{Ethereum, EthereumWallet};
use alloy_primitives::{Address, B256, U256};
use alloy_provider::{
    DynProvider, PendingTransactionBuilder, PendingTransactionError, Provider, ProviderBuilder,
};
use alloy_rpc_types_eth::TransactionReceipt;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::RpcError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use url::Url;

impl From<alloy_contract::Error> for GatewayError {
    fn from(err: alloy_contract::Error) -> Self {
        use alloy_contract::Error;

        match err {
            Error::TransportError(RpcError::ErrorResp(payload)) => {
                Self::Rejected(payload.to_string())
            }
            Error::TransportError(err) => Self::Transport(err.to_string()),
            Error::PendingTransactionError(err) => Self::Transport(err.to_string()),
            // No code at the address, or an ABI that does not match it.
            err @ (Error::ZeroData(..)
            | Error::AbiError(_)
            | Error::ContractNotDeployed
            | Error::NotADeploymentTransaction
            | Error::UnknownFunction(_)
            | Error::UnknownSelector(_)) => Self::Rejected(err.to_string()),
        }
    }
}

/// Classify a failed receipt wait.
fn pending_error(tx_hash: B256, err: PendingTransactionError) -> GatewayError {
    match err {
        PendingTransactionError::TxWatcher(_) => GatewayError::ConfirmationTimeout { tx_hash },
        other => GatewayError::Transport(other.to_string()),
    }
}

/// A mined receipt only counts with a success status.
fn require_success(receipt: TransactionReceipt) -> Result<TransactionReceipt, GatewayError> {
    if !receipt.status() {
        return Err(GatewayError::Reverted {
            tx_hash: receipt.transaction_hash,
        });
    }
    Ok(receipt)
}

/// Alloy-backed gateway for one chain.
#[derive(Debug, Clone)]
pub struct RpcGateway {
    chain: ChainSlug,
    provider: DynProvider,
    confirmation_timeout: Duration,
}

impl RpcGateway {
    /// Connect to `url`, signing transactions with `signer`.
    pub fn connect(
        chain: ChainSlug,
        url: Url,
        signer: PrivateKeySigner,
        confirmation_timeout: Duration,
    ) -> Self {
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();
        Self {
            chain,
            provider,
            confirmation_timeout,
        }
    }

    /// Wait for the transaction to be mined and require a success status.
    async fn confirm(
        &self,
        pending: PendingTransactionBuilder<Ethereum>,
    ) -> Result<TransactionReceipt, GatewayError> {
        let tx_hash = *pending.tx_hash();
        debug!(chain = %self.chain, %tx_hash, "Waiting for confirmation");

        let receipt = pending
            .with_timeout(Some(self.confirmation_timeout))
            .get_receipt()
            .await
            .map_err(|err| pending_error(tx_hash, err))?;
        require_success(receipt)
    }

    async fn confirmed(
        &self,
        pending: PendingTransactionBuilder<Ethereum>,
    ) -> Result<TxConfirmation, GatewayError> {
        let receipt = self.confirm(pending).await?;
        Ok(TxConfirmation {
            tx_hash: receipt.transaction_hash,
        })
    }
}

#[async_trait]
impl ChainGateway for RpcGateway {
    fn chain(&self) -> ChainSlug {
        self.chain
    }

    async fn register_switchboard(
        &self,
        socket: Address,
        request: &RegistrationRequest,
    ) -> Result<RegistrationReceipt, GatewayError> {
        let socket = ISocket::new(socket, &self.provider);
        let pending = socket
            .registerSwitchBoard(
                request.switchboard,
                request.sibling.get(),
                request.max_packet_length,
                request.capacitor_type,
            )
            .send()
            .await?;
        let receipt = self.confirm(pending).await?;

        let added = receipt
            .inner
            .logs()
            .iter()
            .filter_map(|log| log.log_decode::<ISocket::SwitchboardAdded>().ok())
            .map(|log| log.inner.data)
            .find(|event| event.switchBoard == request.switchboard);

        Ok(RegistrationReceipt {
            tx_hash: receipt.transaction_hash,
            capacitor: added.as_ref().map(|e| e.capacitor),
            decapacitor: added.as_ref().map(|e| e.decapacitor),
        })
    }

    async fn is_attester(
        &self,
        switchboard: Address,
        attester: Address,
        sibling: ChainSlug,
    ) -> Result<bool, GatewayError> {
        let switchboard = ISwitchboard::new(switchboard, &self.provider);
        Ok(switchboard
            .isAttester(attester, U256::from(sibling.get()))
            .call()
            .await?)
    }

    async fn grant_attester(
        &self,
        switchboard: Address,
        sibling: ChainSlug,
        attester: Address,
    ) -> Result<TxConfirmation, GatewayError> {
        let switchboard = ISwitchboard::new(switchboard, &self.provider);
        let pending = switchboard
            .grantAttesterRole(U256::from(sibling.get()), attester)
            .send()
            .await?;
        self.confirmed(pending).await
    }

    async fn remote_pointer(
        &self,
        switchboard: Address,
        kind: RemoteLinkKind,
    ) -> Result<Address, GatewayError> {
        let pointer = match kind {
            RemoteLinkKind::FxChildTunnel => {
                IPolygonL1Switchboard::new(switchboard, &self.provider)
                    .fxChildTunnel()
                    .call()
                    .await?
            }
            RemoteLinkKind::FxRootTunnel => {
                IPolygonL2Switchboard::new(switchboard, &self.provider)
                    .fxRootTunnel()
                    .call()
                    .await?
            }
            RemoteLinkKind::RemoteNativeSwitchboard => {
                INativeSwitchboard::new(switchboard, &self.provider)
                    .remoteNativeSwitchboard()
                    .call()
                    .await?
            }
        };
        Ok(pointer)
    }

    async fn set_remote_pointer(
        &self,
        switchboard: Address,
        kind: RemoteLinkKind,
        remote: Address,
    ) -> Result<TxConfirmation, GatewayError> {
        let pending = match kind {
            RemoteLinkKind::FxChildTunnel => {
                IPolygonL1Switchboard::new(switchboard, &self.provider)
                    .setFxChildTunnel(remote)
                    .send()
                    .await?
            }
            RemoteLinkKind::FxRootTunnel => {
                IPolygonL2Switchboard::new(switchboard, &self.provider)
                    .setFxRootTunnel(remote)
                    .send()
                    .await?
            }
            RemoteLinkKind::RemoteNativeSwitchboard => {
                INativeSwitchboard::new(switchboard, &self.provider)
                    .updateRemoteNativeSwitchboard(remote)
                    .send()
                    .await?
            }
        };
        self.confirmed(pending).await
    }

    async fn parameter_value(
        &self,
        registry: Address,
        kind: ParameterKind,
        dst: ChainSlug,
    ) -> Result<U256, GatewayError> {
        let dst = U256::from(dst.get());
        let value = match kind {
            ParameterKind::ProposeGasLimit => {
                ITransmitManager::new(registry, &self.provider)
                    .proposeGasLimit(dst)
                    .call()
                    .await?
            }
            ParameterKind::AttestGasLimit => {
                ISwitchboard::new(registry, &self.provider).attestGasLimit(dst).call().await?
            }
            ParameterKind::ExecutionOverhead => {
                ISwitchboard::new(registry, &self.provider).executionOverhead(dst).call().await?
            }
        };
        Ok(value)
    }

    async fn next_nonce(&self, registry: Address, signer: Address) -> Result<U256, GatewayError> {
        // Transmit manager and switchboards expose the same `nextNonce(address)` selector.
        Ok(ISwitchboard::new(registry, &self.provider).nextNonce(signer).call().await?)
    }

    async fn submit_parameter_update(
        &self,
        route: SubmissionRoute,
        update: &SignedParameterUpdate,
    ) -> Result<TxConfirmation, GatewayError> {
        let message = &update.message;
        let dst = U256::from(message.dst.get());
        let signature = update.signature.clone();

        let pending = match route {
            SubmissionRoute::Direct => match message.kind {
                ParameterKind::ProposeGasLimit => {
                    ITransmitManager::new(update.registry, &self.provider)
                        .setProposeGasLimit(message.nonce, dst, message.value, signature)
                        .send()
                        .await?
                }
                ParameterKind::AttestGasLimit => {
                    ISwitchboard::new(update.registry, &self.provider)
                        .setAttestGasLimit(message.nonce, dst, message.value, signature)
                        .send()
                        .await?
                }
                ParameterKind::ExecutionOverhead => {
                    ISwitchboard::new(update.registry, &self.provider)
                        .setExecutionOverhead(message.nonce, dst, message.value, signature)
                        .send()
                        .await?
                }
            },
            SubmissionRoute::Batcher(batcher) => {
                let batcher = ISocketBatcher::new(batcher, &self.provider);
                let requests = vec![ISocketBatcher::UpdateRequest {
                    nonce: message.nonce,
                    dstChainSlug: dst,
                    value: message.value,
                    signature,
                }];
                match message.kind {
                    ParameterKind::ProposeGasLimit => {
                        batcher.setProposeGasLimits(requests, update.registry).send().await?
                    }
                    ParameterKind::AttestGasLimit => {
                        batcher.setAttestGasLimits(requests, update.registry).send().await?
                    }
                    ParameterKind::ExecutionOverhead => {
                        batcher.setExecutionOverheads(requests, update.registry).send().await?
                    }
                }
            }
        };
        self.confirmed(pending).await
    }
}
