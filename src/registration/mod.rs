//! Registration Driver
//!
//! Registers switchboards on a chain's socket, one (sibling, integration type)
//! pair at a time:
//!
//! - fast and optimistic for every sibling
//! - native only for siblings the ledger already requests it for
//!
//! A pair whose ledger entry already records the same switchboard, capacitor type
//! and packet length is skipped without a transaction. Every successful
//! registration is written through to the ledger before the next pair starts.

use crate::chains::{ChainRegistry, ChainSlug};
use crate::constants::roles;
use crate::contracts::{ChainGateway, RegistrationRequest};
use crate::ledger::{IntegrationConfig, LedgerStore};
use crate::report::{StepKind, StepOutcome, StepStatus};
use crate::switchboard::{self, IntegrationType, SwitchboardRef, SwitchboardSelection};
use alloy_primitives::Address;
use tracing::{info, warn};

/// Socket registration arguments shared by every pair of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacitorSettings {
    pub capacitor_type: u32,
    pub max_packet_length: u32,
}

impl Default for CapacitorSettings {
    fn default() -> Self {
        Self {
            capacitor_type: crate::constants::DEFAULT_CAPACITOR_TYPE,
            max_packet_length: crate::constants::DEFAULT_MAX_PACKET_LENGTH,
        }
    }
}

/// Register `switchboard` for `dst` on the gateway's chain, unless the ledger
/// already records that exact registration.
pub async fn ensure_registered(
    gateway: &dyn ChainGateway,
    ledger: &LedgerStore,
    dst: ChainSlug,
    switchboard: &SwitchboardRef,
    settings: CapacitorSettings,
) -> StepStatus {
    let src = gateway.chain();
    let integration = switchboard.integration;
    let record = ledger.record(src).await.unwrap_or_default();

    let already = record.integration(dst, integration).is_some_and(|config| {
        config.matches_registration(
            switchboard.address,
            settings.capacitor_type,
            settings.max_packet_length,
        )
    });
    if already {
        info!(%src, sibling = %dst, %integration, "Switchboard already registered, skipping");
        return StepStatus::skipped(format!("{integration} already registered"));
    }

    let Some(socket) = record.contract(roles::SOCKET) else {
        warn!(%src, sibling = %dst, %integration, "Socket not deployed");
        return StepStatus::failed(format!("{} not deployed on {src}", roles::SOCKET));
    };

    let request = RegistrationRequest {
        switchboard: switchboard.address,
        sibling: dst,
        capacitor_type: settings.capacitor_type,
        max_packet_length: settings.max_packet_length,
    };
    let receipt = match gateway.register_switchboard(socket, &request).await {
        Ok(receipt) => receipt,
        Err(err) => {
            warn!(%src, sibling = %dst, %integration, error = %err, "Registration failed");
            return StepStatus::from_gateway(&err);
        }
    };
    if receipt.capacitor.is_none() {
        warn!(
            %src, sibling = %dst, %integration, tx_hash = %receipt.tx_hash,
            "SwitchboardAdded event not found in receipt"
        );
    }

    let persisted = ledger
        .update(src, |record| {
            // keep fields other steps own, such as the remote link
            let mut config = record
                .integration(dst, integration)
                .filter(|existing| existing.switchboard == switchboard.address)
                .cloned()
                .unwrap_or_else(|| IntegrationConfig::new(switchboard.address));
            config.capacitor_type = Some(settings.capacitor_type);
            config.max_packet_length = Some(settings.max_packet_length);
            config.capacitor = receipt.capacitor.or(config.capacitor);
            config.decapacitor = receipt.decapacitor.or(config.decapacitor);
            record.set_integration(dst, integration, config);
        })
        .await;

    match persisted {
        Ok(()) => {
            info!(
                %src, sibling = %dst, %integration, switchboard = %switchboard.address,
                tx_hash = %receipt.tx_hash,
                "Switchboard registered"
            );
            StepStatus::Applied { tx_hash: receipt.tx_hash }
        }
        Err(err) => {
            warn!(
                %src, sibling = %dst, %integration, error = %err,
                "Persisting registration failed"
            );
            StepStatus::failed(err)
        }
    }
}

/// Run every registration of the gateway's chain.
///
/// Failures are recorded per pair and never stop the remaining pairs.
pub async fn register_all(
    gateway: &dyn ChainGateway,
    ledger: &LedgerStore,
    registry: &ChainRegistry,
    settings: CapacitorSettings,
) -> Vec<StepOutcome> {
    let src = gateway.chain();
    let siblings = registry.siblings(src);
    let mut outcomes = Vec::new();

    let native_siblings = ledger
        .record(src)
        .await
        .map(|r| r.native_siblings())
        .unwrap_or_default();
    for dst in native_siblings {
        let integration = IntegrationType::Native;
        outcomes.push(register_pair(gateway, ledger, registry, settings, integration, dst).await);
    }

    for dst in siblings {
        for integration in IntegrationType::SHARED {
            outcomes
                .push(register_pair(gateway, ledger, registry, settings, integration, dst).await);
        }
    }
    outcomes
}

async fn register_pair(
    gateway: &dyn ChainGateway,
    ledger: &LedgerStore,
    registry: &ChainRegistry,
    settings: CapacitorSettings,
    integration: IntegrationType,
    dst: ChainSlug,
) -> StepOutcome {
    let src = gateway.chain();
    let record = ledger.record(src).await.unwrap_or_default();
    let step = StepKind::Register(integration);

    let status = match switchboard::select(registry, &record, integration, src, dst) {
        SwitchboardSelection::Selected(sb) => {
            ensure_registered(gateway, ledger, dst, &sb, settings).await
        }
        SwitchboardSelection::Unsupported(reason) => {
            info!(%src, sibling = %dst, %integration, %reason, "Pair unsupported, skipping");
            StepStatus::skipped(reason.to_string())
        }
    };
    StepOutcome::new(src, dst, step, status)
}

/// Give every attester the attester role on the chain's fast switchboard for
/// every sibling, granting only where it is missing.
pub async fn ensure_attesters(
    gateway: &dyn ChainGateway,
    ledger: &LedgerStore,
    registry: &ChainRegistry,
    attesters: &[Address],
) -> Vec<StepOutcome> {
    let src = gateway.chain();
    if attesters.is_empty() {
        return Vec::new();
    }
    let record = ledger.record(src).await.unwrap_or_default();
    let switchboard = record.contract(roles::FAST_SWITCHBOARD);

    let mut outcomes = Vec::new();
    for dst in registry.siblings(src) {
        for attester in attesters {
            let step = StepKind::GrantAttester(*attester);
            let status = match switchboard {
                Some(switchboard) => grant_attester(gateway, switchboard, dst, *attester).await,
                None => StepStatus::skipped(format!("{} not deployed", roles::FAST_SWITCHBOARD)),
            };
            outcomes.push(StepOutcome::new(src, dst, step, status));
        }
    }
    outcomes
}

async fn grant_attester(
    gateway: &dyn ChainGateway,
    switchboard: Address,
    dst: ChainSlug,
    attester: Address,
) -> StepStatus {
    let src = gateway.chain();
    match gateway.is_attester(switchboard, attester, dst).await {
        Ok(true) => {
            info!(%src, sibling = %dst, %attester, "Attester already granted, skipping");
            return StepStatus::skipped("attester already granted");
        }
        Ok(false) => {}
        Err(err) => {
            warn!(%src, sibling = %dst, %attester, error = %err, "Reading attester role failed");
            return StepStatus::from_gateway(&err);
        }
    }

    match gateway.grant_attester(switchboard, dst, attester).await {
        Ok(confirmation) => {
            info!(
                %src, sibling = %dst, %attester, tx_hash = %confirmation.tx_hash,
                "Attester granted"
            );
            StepStatus::Applied { tx_hash: confirmation.tx_hash }
        }
        Err(err) => {
            warn!(%src, sibling = %dst, %attester, error = %err, "Granting attester failed");
            StepStatus::from_gateway(&err)
        }
    }
}
