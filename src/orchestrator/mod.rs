//! Top-level driver
//!
//! A run has two phases:
//!
//! 1. Per source chain: socket registrations, attester grants, then the signed
//!    parameter updates for every sibling.
//! 2. Per source chain: remote links of the native switchboards. This needs the
//!    native switchboards of *both* sides in the ledger, so it starts only after
//!    phase 1 has finished everywhere.
//!
//! Source chains have disjoint state and may run concurrently
//! (`chain_concurrency`). Inside a chain, steps run one after another. Per-step
//! and per-chain failures end up in the [`RunReport`]; only invalid input aborts
//! the run.

pub mod errors;

pub use errors::OrchestratorError;

use crate::chains::{ChainRegistry, ChainSlug};
use crate::contracts::{ChainGateway, Gateways};
use crate::ledger::LedgerStore;
use crate::limits::LimitsConfig;
use crate::params::{ParameterKind, ParameterTarget, ParameterUpdater, SubmissionRoute};
use crate::registration::{self, CapacitorSettings};
use crate::remote_link;
use crate::report::{RunReport, StepKind, StepOutcome, StepStatus};
use alloy_primitives::{Address, U256};
use futures_util::{stream, StreamExt};
use std::sync::Arc;
use tracing::{info, warn};

/// Knobs of one run.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Socket registration arguments
    pub capacitor: CapacitorSettings,
    /// Attesters to grant on every fast switchboard
    pub attesters: Vec<Address>,
    /// Restrict the run to these source chains (all ledger chains when `None`)
    pub chains: Option<Vec<ChainSlug>>,
    pub skip_parameters: bool,
    pub skip_remote_links: bool,
    /// Source chains processed concurrently
    pub chain_concurrency: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            capacitor: CapacitorSettings::default(),
            attesters: Vec::new(),
            chains: None,
            skip_parameters: false,
            skip_remote_links: false,
            chain_concurrency: 1,
        }
    }
}

/// Drives the whole mesh towards the configuration recorded in the ledger.
#[derive(Clone)]
pub struct Orchestrator {
    registry: Arc<ChainRegistry>,
    ledger: Arc<LedgerStore>,
    gateways: Gateways,
    updater: ParameterUpdater,
    limits: LimitsConfig,
    config: OrchestratorConfig,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("ledger", &self.ledger.path())
            .field("gateways", &self.gateways.keys().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}

impl Orchestrator {
    pub fn new(
        registry: Arc<ChainRegistry>,
        ledger: Arc<LedgerStore>,
        gateways: Gateways,
        updater: ParameterUpdater,
        limits: LimitsConfig,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            registry,
            ledger,
            gateways,
            updater,
            limits,
            config,
        }
    }

    /// Source chains of this run, in ledger order.
    ///
    /// Explicitly requested chains must be declared and deployed. Ledger chains
    /// unknown to the registry are left out with a warning.
    pub async fn source_chains(&self) -> Result<Vec<ChainSlug>, OrchestratorError> {
        let snapshot = self.ledger.snapshot().await;

        if let Some(requested) = &self.config.chains {
            for chain in requested {
                if !self.registry.is_declared(*chain) {
                    return Err(OrchestratorError::UnknownChain(*chain));
                }
                if !snapshot.contains_key(chain) {
                    return Err(OrchestratorError::NotDeployed(*chain));
                }
            }
        }

        Ok(snapshot
            .keys()
            .copied()
            .filter(|chain| {
                let declared = self.registry.is_declared(*chain);
                if !declared {
                    warn!(%chain, "Ledger chain not in chain registry, ignoring");
                }
                declared
            })
            .filter(|chain| self.config.chains.as_ref().map_or(true, |c| c.contains(chain)))
            .collect())
    }

    /// Run both phases and collect every step outcome.
    pub async fn run(&self) -> Result<RunReport, OrchestratorError> {
        let chains = self.source_chains().await?;
        let concurrency = self.config.chain_concurrency.max(1);
        info!(chains = chains.len(), concurrency, "Configuring chains");

        let mut report = RunReport::default();
        let configured: Vec<RunReport> = stream::iter(chains.iter().copied())
            .map(|chain| self.configure_chain(chain))
            .buffer_unordered(concurrency)
            .collect()
            .await;
        configured.into_iter().for_each(|r| report.merge(r));

        if self.config.skip_remote_links {
            info!("Skipping remote links");
            return Ok(report);
        }

        let snapshot = self.ledger.snapshot().await;
        let linked: Vec<Vec<StepOutcome>> = stream::iter(chains.iter().copied())
            .filter_map(|chain| async move { self.gateway(chain) })
            .map(|gateway| {
                let snapshot = &snapshot;
                async move {
                    remote_link::sync_remote_links(
                        gateway.as_ref(),
                        &self.ledger,
                        &self.registry,
                        snapshot,
                    )
                    .await
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;
        linked.into_iter().for_each(|outcomes| report.extend(outcomes));

        Ok(report)
    }

    fn gateway(&self, chain: ChainSlug) -> Option<Arc<dyn ChainGateway>> {
        self.gateways.get(&chain).cloned()
    }

    /// Phase 1 for one source chain.
    async fn configure_chain(&self, src: ChainSlug) -> RunReport {
        let mut report = RunReport::default();
        let Some(gateway) = self.gateway(src) else {
            warn!(chain = %src, "No RPC connection for chain, skipping");
            report.chain_errors.push((src, "no RPC connection".to_string()));
            return report;
        };
        let gateway = gateway.as_ref();
        info!(chain = %src, "Configuring chain");

        report.extend(
            registration::register_all(gateway, &self.ledger, &self.registry, self.config.capacitor)
                .await,
        );
        report.extend(
            registration::ensure_attesters(
                gateway,
                &self.ledger,
                &self.registry,
                &self.config.attesters,
            )
            .await,
        );

        if !self.config.skip_parameters {
            report.extend(self.update_parameters(gateway, src).await);
        }
        report
    }

    /// Every parameter on every registry of `src`, for every sibling.
    async fn update_parameters(
        &self,
        gateway: &dyn ChainGateway,
        src: ChainSlug,
    ) -> Vec<StepOutcome> {
        let record = self.ledger.record(src).await.unwrap_or_default();
        let route = SubmissionRoute::for_record(&record);

        let mut outcomes = Vec::new();
        for dst in self.registry.siblings(src) {
            let limits = self.limits.for_destination(dst);
            for kind in ParameterKind::ALL {
                let value = U256::from(limits.get(kind));
                for &role in kind.registry_roles() {
                    let step = StepKind::Parameter {
                        kind,
                        registry: role,
                    };
                    let status = match record.contract(role) {
                        Some(registry) => {
                            let target = ParameterTarget {
                                kind,
                                registry,
                                route,
                            };
                            self.updater.update_parameter(gateway, target, dst, value).await
                        }
                        None => {
                            info!(
                                chain = %src, sibling = %dst, %kind, role,
                                "Registry not deployed, skipping"
                            );
                            StepStatus::skipped(format!("{role} not deployed"))
                        }
                    };
                    outcomes.push(StepOutcome::new(src, dst, step, status));
                }
            }
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::{ChainInfo, NetworkClass};
    use crate::constants::roles;
    use crate::contracts::mock::MockGateway;
    use crate::contracts::GatewayError;
    use crate::ledger::test_utils::TempDir;
    use crate::ledger::{ChainRecord, DeploymentAddresses, DeploymentMode, IntegrationConfig};
    use crate::remote_link::RemoteLinkKind;
    use crate::signer::SignerManager;
    use crate::switchboard::{IntegrationType, NativeSwitchboardVariant};
    use alloy_primitives::address;

    const A: ChainSlug = ChainSlug(1);
    const B: ChainSlug = ChainSlug(2);
    const OPERATOR_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn registry() -> ChainRegistry {
        ChainRegistry::new()
            .with_chain(ChainInfo::new(A, "chain-a", NetworkClass::Testnet))
            .with_chain(ChainInfo::new(B, "chain-b", NetworkClass::Testnet))
            .with_native(A, B, NativeSwitchboardVariant::ArbitrumL1)
            .with_native(B, A, NativeSwitchboardVariant::ArbitrumL2)
    }

    fn deployed(prefix: u8, native_to: ChainSlug) -> ChainRecord {
        let addr = |n: u8| Address::left_padding_from(&[prefix, n]);
        let mut record = ChainRecord::default()
            .with_contract(roles::SOCKET, addr(1))
            .with_contract(roles::FAST_SWITCHBOARD, addr(2))
            .with_contract(roles::OPTIMISTIC_SWITCHBOARD, addr(3))
            .with_contract(roles::TRANSMIT_MANAGER, addr(4));
        record.set_integration(native_to, IntegrationType::Native, IntegrationConfig::new(addr(5)));
        record
    }

    struct Harness {
        _dir: TempDir,
        ledger: Arc<LedgerStore>,
        a: Arc<MockGateway>,
        b: Arc<MockGateway>,
        orchestrator: Orchestrator,
    }

    async fn harness(config: OrchestratorConfig) -> Harness {
        let dir = TempDir::new().unwrap();
        let ledger = Arc::new(LedgerStore::from_state(
            crate::ledger::ledger_path(dir.path(), DeploymentMode::Dev),
            DeploymentAddresses::from([(A, deployed(0xa, B)), (B, deployed(0xb, A))]),
        ));
        let a = Arc::new(MockGateway::new(A));
        let b = Arc::new(MockGateway::new(B));
        let gateways: Gateways = [
            (A, a.clone() as Arc<dyn ChainGateway>),
            (B, b.clone() as Arc<dyn ChainGateway>),
        ]
        .into_iter()
        .collect();

        let signers = Arc::new(SignerManager::new());
        signers.add_signer_from_hex(OPERATOR_KEY).await.unwrap();

        let orchestrator = Orchestrator::new(
            Arc::new(registry()),
            ledger.clone(),
            gateways,
            ParameterUpdater::new(signers),
            LimitsConfig::default(),
            config,
        );
        Harness {
            _dir: dir,
            ledger,
            a,
            b,
            orchestrator,
        }
    }

    #[tokio::test]
    async fn test_full_run_then_rerun_is_noop() {
        let h = harness(OrchestratorConfig::default()).await;

        let first = h.orchestrator.run().await.unwrap();
        assert!(first.is_clean(), "{:?}", first.failures().collect::<Vec<_>>());
        // per chain: 3 registrations, 4 parameter updates, 1 remote link
        assert_eq!(first.applied(), 16);
        assert_eq!(h.a.tx_count(), 8);
        assert_eq!(h.b.tx_count(), 8);

        let a_native = Address::left_padding_from(&[0xa, 5]);
        let b_native = Address::left_padding_from(&[0xb, 5]);
        assert_eq!(h.a.pointer(a_native, RemoteLinkKind::RemoteNativeSwitchboard), b_native);
        assert_eq!(h.b.pointer(b_native, RemoteLinkKind::RemoteNativeSwitchboard), a_native);

        let second = h.orchestrator.run().await.unwrap();
        assert!(second.is_clean());
        assert_eq!(second.applied(), 0);
        assert_eq!(second.skipped(), first.applied());
        assert_eq!(h.a.tx_count() + h.b.tx_count(), 16);
    }

    #[tokio::test]
    async fn test_run_is_resumable_from_persisted_ledger() {
        let h = harness(OrchestratorConfig {
            skip_parameters: true,
            skip_remote_links: true,
            ..Default::default()
        })
        .await;
        h.orchestrator.run().await.unwrap();

        let reloaded = LedgerStore::load(
            h.ledger.path().parent().unwrap(),
            DeploymentMode::Dev,
        )
        .unwrap();
        assert_eq!(reloaded.snapshot().await, h.ledger.snapshot().await);
        let record = reloaded.record(A).await.unwrap();
        assert!(record.integration(B, IntegrationType::Fast).is_some());
        assert!(record.integration(B, IntegrationType::Optimistic).is_some());
    }

    #[tokio::test]
    async fn test_failing_chain_does_not_stop_others() {
        let h = harness(OrchestratorConfig {
            chain_concurrency: 2,
            ..Default::default()
        })
        .await;
        h.a.fail_writes(GatewayError::Transport("connection reset".into()));

        let report = h.orchestrator.run().await.unwrap();
        assert!(report.failed() > 0);
        assert!(report.failures().all(|o| o.chain == A));
        assert!(report
            .failures()
            .all(|o| matches!(o.status, StepStatus::Failed { transient: true, .. })));
        // B registers and updates; its link needs A's native record, which exists
        assert_eq!(h.b.tx_count(), 8);
    }

    #[tokio::test]
    async fn test_chain_filter() {
        let h = harness(OrchestratorConfig {
            chains: Some(vec![B]),
            ..Default::default()
        })
        .await;

        let report = h.orchestrator.run().await.unwrap();
        assert!(report.outcomes.iter().all(|o| o.chain == B));
        assert_eq!(h.a.tx_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_or_undeployed_chain_aborts() {
        let h = harness(OrchestratorConfig {
            chains: Some(vec![ChainSlug(999)]),
            ..Default::default()
        })
        .await;
        assert!(matches!(
            h.orchestrator.run().await,
            Err(OrchestratorError::UnknownChain(ChainSlug(999)))
        ));
    }

    #[tokio::test]
    async fn test_missing_gateway_is_chain_error() {
        let mut h = harness(OrchestratorConfig::default()).await;
        h.orchestrator.gateways.remove(&B);

        let report = h.orchestrator.run().await.unwrap();
        assert_eq!(report.chain_errors.len(), 1);
        assert_eq!(report.chain_errors[0].0, B);
        assert!(report.outcomes.iter().all(|o| o.chain == A));
    }

    #[tokio::test]
    async fn test_attesters_and_limits() {
        let attester = address!("00000000000000000000000000000000000a77e5");
        let mut h = harness(OrchestratorConfig {
            attesters: vec![attester],
            skip_remote_links: true,
            ..Default::default()
        })
        .await;
        h.orchestrator.limits =
            serde_json::from_str(r#"{ "2": { "proposeGasLimit": 250000 } }"#).unwrap();

        let report = h.orchestrator.run().await.unwrap();
        assert!(report.is_clean());
        assert!(h.a.has_attester(Address::left_padding_from(&[0xa, 2]), attester, B));
        assert_eq!(
            h.a.parameter(
                Address::left_padding_from(&[0xa, 4]),
                ParameterKind::ProposeGasLimit,
                B
            ),
            U256::from(250_000)
        );
    }
}
