//! Remote-Link Synchronizer
//!
//! A native switchboard only trusts messages from its counterpart on the paired
//! chain, so each side has to be pointed at the other. How that pointer is set
//! depends on the chain family:
//!
//! | Variant                      | Pointer                   | Rule                      |
//! |------------------------------|---------------------------|---------------------------|
//! | Polygon L1                   | `fxChildTunnel`           | set once, while zero      |
//! | Polygon L2                   | `fxRootTunnel`            | set once, while zero      |
//! | Arbitrum L1/L2, Optimism     | `remoteNativeSwitchboard` | update until it matches   |
//!
//! Every handler is check-then-act, so re-running against a partially linked mesh
//! only submits the missing links.

use crate::chains::{ChainRegistry, ChainSlug};
use crate::contracts::ChainGateway;
use crate::ledger::{DeploymentAddresses, LedgerStore};
use crate::report::{StepKind, StepOutcome, StepStatus};
use crate::switchboard::{self, IntegrationType, NativeSwitchboardVariant, SwitchboardSelection};
use alloy_primitives::Address;
use std::fmt;
use tracing::{info, warn};

/// The remote pointer a native switchboard variant exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteLinkKind {
    /// `fxChildTunnel` on the Ethereum side of Polygon PoS
    FxChildTunnel,
    /// `fxRootTunnel` on the Polygon side
    FxRootTunnel,
    /// `remoteNativeSwitchboard` on Arbitrum and Optimism switchboards
    RemoteNativeSwitchboard,
}

impl RemoteLinkKind {
    /// Pointer exposed by `variant`.
    pub fn for_variant(variant: NativeSwitchboardVariant) -> Self {
        match variant {
            NativeSwitchboardVariant::PolygonL1 => Self::FxChildTunnel,
            NativeSwitchboardVariant::PolygonL2 => Self::FxRootTunnel,
            NativeSwitchboardVariant::ArbitrumL1 => Self::RemoteNativeSwitchboard,
            NativeSwitchboardVariant::ArbitrumL2 => Self::RemoteNativeSwitchboard,
            NativeSwitchboardVariant::Optimism => Self::RemoteNativeSwitchboard,
        }
    }

    /// Tunnels can only be set while unset; the contract refuses to change them.
    pub fn is_write_once(&self) -> bool {
        matches!(self, Self::FxChildTunnel | Self::FxRootTunnel)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FxChildTunnel => "fxChildTunnel",
            Self::FxRootTunnel => "fxRootTunnel",
            Self::RemoteNativeSwitchboard => "remoteNativeSwitchboard",
        }
    }
}

impl fmt::Display for RemoteLinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point the native switchboard of `src → dst` at `remote`.
///
/// On success (or when the link is already in place) the on-chain pointer is
/// mirrored into the ledger as `remoteSwitchboard` and persisted.
pub async fn ensure_remote_linked(
    gateway: &dyn ChainGateway,
    ledger: &LedgerStore,
    dst: ChainSlug,
    variant: NativeSwitchboardVariant,
    switchboard: Address,
    remote: Address,
) -> StepStatus {
    let src = gateway.chain();
    let kind = RemoteLinkKind::for_variant(variant);

    let current = match gateway.remote_pointer(switchboard, kind).await {
        Ok(current) => current,
        Err(err) => {
            warn!(%src, sibling = %dst, %variant, error = %err, "Reading remote pointer failed");
            return StepStatus::from_gateway(&err);
        }
    };

    let already_linked = if kind.is_write_once() {
        !current.is_zero()
    } else {
        current == remote
    };

    let (status, linked) = if already_linked {
        if current != remote {
            warn!(
                %src, sibling = %dst, %variant, %current, expected = %remote,
                "Tunnel already points elsewhere and cannot be changed"
            );
        }
        info!(%src, sibling = %dst, %variant, %switchboard, "Remote link in place, skipping");
        (StepStatus::skipped(format!("{kind} already set to {current}")), current)
    } else {
        match gateway.set_remote_pointer(switchboard, kind, remote).await {
            Ok(confirmation) => {
                info!(
                    %src, sibling = %dst, %variant, %switchboard, %remote,
                    tx_hash = %confirmation.tx_hash,
                    "Remote link set"
                );
                (StepStatus::Applied { tx_hash: confirmation.tx_hash }, remote)
            }
            Err(err) => {
                warn!(%src, sibling = %dst, %variant, error = %err, "Setting remote link failed");
                return StepStatus::from_gateway(&err);
            }
        }
    };

    match record_link(ledger, src, dst, linked).await {
        Ok(()) => status,
        Err(err) => {
            warn!(%src, sibling = %dst, error = %err, "Persisting remote link failed");
            StepStatus::failed(err)
        }
    }
}

async fn record_link(
    ledger: &LedgerStore,
    src: ChainSlug,
    dst: ChainSlug,
    linked: Address,
) -> Result<(), crate::ledger::LedgerError> {
    let record = ledger.record(src).await;
    let recorded = record
        .as_ref()
        .and_then(|r| r.integration(dst, IntegrationType::Native))
        .and_then(|c| c.remote_switchboard);
    if recorded == Some(linked) {
        return Ok(());
    }
    ledger
        .update(src, |record| {
            if let Some(config) = record.integration_mut(dst, IntegrationType::Native) {
                config.remote_switchboard = Some(linked);
            }
        })
        .await
}

/// Link every native switchboard the gateway's chain has registered.
///
/// `snapshot` supplies the counterpart addresses: the remote for `src → dst` is
/// the native switchboard `dst` registered for `src`.
pub async fn sync_remote_links(
    gateway: &dyn ChainGateway,
    ledger: &LedgerStore,
    registry: &ChainRegistry,
    snapshot: &DeploymentAddresses,
) -> Vec<StepOutcome> {
    let src = gateway.chain();
    let Some(record) = snapshot.get(&src) else {
        return Vec::new();
    };

    let mut outcomes = Vec::new();
    for dst in record.native_siblings() {
        let local = match switchboard::select(registry, record, IntegrationType::Native, src, dst) {
            SwitchboardSelection::Selected(sb) => sb,
            SwitchboardSelection::Unsupported(reason) => {
                info!(%src, sibling = %dst, %reason, "Pair unsupported, skipping link");
                outcomes.push(StepOutcome::new(
                    src,
                    dst,
                    StepKind::RemoteLink(None),
                    StepStatus::skipped(reason.to_string()),
                ));
                continue;
            }
        };
        // Native selections always carry their variant.
        let Some(variant) = local.variant else {
            continue;
        };
        let step = StepKind::RemoteLink(Some(variant));

        let remote = snapshot
            .get(&dst)
            .and_then(|r| r.integration(src, IntegrationType::Native))
            .map(|c| c.switchboard);

        let status = match remote {
            Some(remote) => {
                ensure_remote_linked(gateway, ledger, dst, variant, local.address, remote).await
            }
            None => {
                warn!(
                    %src, sibling = %dst, %variant,
                    "Counterpart native switchboard not recorded"
                );
                StepStatus::failed(format!("no native switchboard recorded on {dst} for {src}"))
            }
        };
        outcomes.push(StepOutcome::new(src, dst, step, status));
    }
    outcomes
}
