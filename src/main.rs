use socket_mesh_configurator::chains::ChainRegistry;
use socket_mesh_configurator::cli::{Cli, OperatorKeySource};
use socket_mesh_configurator::contracts::{ChainGateway, Gateways, RpcGateway};
use socket_mesh_configurator::keystore;
use socket_mesh_configurator::ledger::LedgerStore;
use socket_mesh_configurator::limits::LimitsConfig;
use socket_mesh_configurator::orchestrator::{Orchestrator, OrchestratorConfig};
use socket_mesh_configurator::output;
use socket_mesh_configurator::params::ParameterUpdater;
use socket_mesh_configurator::registration::CapacitorSettings;
use socket_mesh_configurator::signer::SignerManager;

use clap::Parser;
use eyre::{bail, WrapErr};
use std::{sync::Arc, time::Duration};
use tracing::info;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Main entry point for the configurator
#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(cli.log_json.then(|| fmt::layer().json()))
        .with((!cli.log_json).then(fmt::layer))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let ledger = Arc::new(
        LedgerStore::load(&cli.deployments_dir, cli.mode)
            .wrap_err("Failed to load address ledger")?,
    );

    let registry = Arc::new(
        cli.rpc_overrides
            .iter()
            .cloned()
            .fold(ChainRegistry::builtin(), |registry, (chain, url)| {
                registry.with_rpc_override(chain, url)
            }),
    );

    output::print_banner(cli.mode, ledger.path());

    // Operator key: an explicit keystore wins over a hex key
    let signers = Arc::new(SignerManager::new());
    let operator = match cli.operator_key_source() {
        Some(OperatorKeySource::Keystore(path)) => {
            let signer = keystore::load_signer(path, &cli.keystore_password)?;
            signers.add_signer(signer).await
        }
        Some(OperatorKeySource::Hex(key)) => signers.add_signer_from_hex(key).await?,
        None => {
            bail!("No operator key: pass --signer-key (or set SOCKET_SIGNER_KEY) or --keystore")
        }
    };
    output::print_operator(&operator);

    let limits = match &cli.limits {
        Some(path) => LimitsConfig::load(path)?,
        None => LimitsConfig::default(),
    };

    let config = OrchestratorConfig {
        capacitor: CapacitorSettings {
            capacitor_type: cli.capacitor_type,
            max_packet_length: cli.max_packet_length,
        },
        attesters: cli.attesters.clone(),
        chains: cli.chains.clone(),
        skip_parameters: cli.skip_parameters,
        skip_remote_links: cli.skip_remote_links,
        chain_concurrency: usize::from(cli.chain_concurrency),
    };
    output::print_config(&config);

    // One gateway per deployed chain with a reachable endpoint. Chains left out here
    // surface as chain errors in the report.
    let timeout = Duration::from_secs(cli.confirmation_timeout_secs);
    let mut gateways = Gateways::new();
    println!();
    for chain in ledger.snapshot().await.into_keys() {
        if config.chains.as_ref().is_some_and(|c| !c.contains(&chain)) {
            continue;
        }
        let Some(info) = registry.get(chain) else {
            continue;
        };
        let url = match registry.rpc_url(chain) {
            Ok(url) => url,
            Err(err) => {
                output::print_chain_unavailable(chain, &err.to_string());
                continue;
            }
        };
        let signer = signers.signer(&signers.operator_for(chain).await?).await?;
        output::print_chain_connected(chain, &info.name, &url);
        let gateway: Arc<dyn ChainGateway> =
            Arc::new(RpcGateway::connect(chain, url, signer, timeout));
        gateways.insert(chain, gateway);
    }

    let orchestrator = Orchestrator::new(
        registry,
        ledger,
        gateways,
        ParameterUpdater::new(signers),
        limits,
        config,
    );
    info!(?orchestrator, "Starting run");

    let report = orchestrator.run().await?;
    output::print_report(&report);
    info!(summary = %output::summary_line(&report), "Run finished");

    Ok(())
}
