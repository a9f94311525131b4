use crate::chains::{parse_rpc_override, ChainSlug};
use crate::constants::{
    DEFAULT_CAPACITOR_TYPE, DEFAULT_CONFIRMATION_TIMEOUT_SECS, DEFAULT_MAX_PACKET_LENGTH,
    SIGNER_KEY_ENV, SIGNER_PASSWORD_ENV,
};
use crate::ledger::DeploymentMode;
use alloy_primitives::Address;
use clap::Parser;
use std::path::{Path, PathBuf};
use url::Url;

/// CLI arguments for the socket mesh configurator
#[derive(Parser, Debug)]
#[command(
    name = "socket-mesh-configurator",
    about = "Wire switchboards and sync cross-chain parameters for deployed sockets"
)]
pub struct Cli {
    /// Deployment environment; selects `<mode>_addresses.json` in the deployments directory.
    #[arg(long, value_enum, default_value = "dev")]
    pub mode: DeploymentMode,

    /// Directory holding the address ledgers
    #[arg(long, default_value = "deployments")]
    pub deployments_dir: PathBuf,

    /// Operator private key (hex, with or without 0x prefix).
    /// Can also be set via SOCKET_SIGNER_KEY environment variable.
    #[arg(long, env = SIGNER_KEY_ENV, hide_env_values = true)]
    pub signer_key: Option<String>,

    /// Encrypted V3 keystore holding the operator key.
    ///
    /// Takes precedence over --signer-key and SOCKET_SIGNER_KEY.
    #[arg(long)]
    pub keystore: Option<PathBuf>,

    /// Password for --keystore.
    /// Can also be set via SOCKET_SIGNER_PASSWORD environment variable.
    #[arg(long, env = SIGNER_PASSWORD_ENV, hide_env_values = true, default_value = "")]
    pub keystore_password: String,

    /// RPC endpoint override as `<chain-slug>=<url>` (repeatable).
    ///
    /// Takes precedence over the chain's `<NETWORK>_RPC` environment variable.
    #[arg(long = "rpc", value_parser = parse_rpc_override)]
    pub rpc_overrides: Vec<(ChainSlug, Url)>,

    /// Capacitor type passed to socket registration
    #[arg(long, default_value_t = DEFAULT_CAPACITOR_TYPE)]
    pub capacitor_type: u32,

    /// Maximum packet length passed to socket registration
    #[arg(long, default_value_t = DEFAULT_MAX_PACKET_LENGTH)]
    pub max_packet_length: u32,

    /// JSON file with per-destination gas limits and execution overheads.
    ///
    /// Destinations it does not list use the built-in defaults.
    #[arg(long)]
    pub limits: Option<PathBuf>,

    /// Only configure these source chains (comma-separated slugs).
    /// Defaults to every chain in the ledger.
    #[arg(long, value_delimiter = ',')]
    pub chains: Option<Vec<ChainSlug>>,

    /// Skip the parameter synchronization steps
    #[arg(long)]
    pub skip_parameters: bool,

    /// Skip the remote switchboard linking phase
    #[arg(long)]
    pub skip_remote_links: bool,

    /// Attester to grant on every fast switchboard (repeatable)
    #[arg(long = "attester")]
    pub attesters: Vec<Address>,

    /// Number of source chains configured concurrently.
    ///
    /// Steps within one chain always run in order.
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u16).range(1..))]
    pub chain_concurrency: u16,

    /// Seconds to wait for a transaction receipt before reporting a timeout
    #[arg(long, default_value_t = DEFAULT_CONFIRMATION_TIMEOUT_SECS)]
    pub confirmation_timeout_secs: u64,

    /// Enable structured JSON logging (for log aggregation).
    ///
    /// Log level is controlled by RUST_LOG (default: info).
    #[arg(long)]
    pub log_json: bool,
}

/// Where the operator key comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKeySource<'a> {
    /// Encrypted V3 keystore file
    Keystore(&'a Path),
    /// Plain hex private key
    Hex(&'a str),
}

impl Cli {
    /// Resolve the operator key source. An explicit `--keystore` wins over a hex key,
    /// which may have come from the environment.
    pub fn operator_key_source(&self) -> Option<OperatorKeySource<'_>> {
        match (&self.keystore, &self.signer_key) {
            (Some(path), _) => Some(OperatorKeySource::Keystore(path)),
            (None, Some(key)) => Some(OperatorKeySource::Hex(key)),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["socket-mesh-configurator", "--signer-key", "ab"]).unwrap();
        assert_eq!(cli.mode, DeploymentMode::Dev);
        assert_eq!(cli.deployments_dir, PathBuf::from("deployments"));
        assert_eq!(cli.capacitor_type, DEFAULT_CAPACITOR_TYPE);
        assert_eq!(cli.max_packet_length, DEFAULT_MAX_PACKET_LENGTH);
        assert_eq!(cli.chain_concurrency, 1);
        assert_eq!(cli.confirmation_timeout_secs, 120);
        assert!(cli.chains.is_none());
        assert!(cli.attesters.is_empty());
        assert!(!cli.skip_parameters);
    }

    #[test]
    fn test_repeated_and_delimited_flags() {
        let cli = Cli::try_parse_from([
            "socket-mesh-configurator",
            "--mode",
            "prod",
            "--chains",
            "1,10",
            "--rpc",
            "1=https://eth.example.org",
            "--rpc",
            "10=https://op.example.org",
            "--attester",
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
            "--chain-concurrency",
            "4",
        ])
        .unwrap();

        assert_eq!(cli.mode, DeploymentMode::Prod);
        assert_eq!(cli.chains, Some(vec![ChainSlug(1), ChainSlug(10)]));
        assert_eq!(cli.rpc_overrides.len(), 2);
        assert_eq!(cli.rpc_overrides[1].0, ChainSlug(10));
        assert_eq!(cli.attesters.len(), 1);
        assert_eq!(cli.chain_concurrency, 4);
    }

    #[test]
    fn test_rejects_bad_rpc_override_and_zero_concurrency() {
        assert!(
            Cli::try_parse_from(["socket-mesh-configurator", "--rpc", "https://no-slug"]).is_err()
        );
        assert!(
            Cli::try_parse_from(["socket-mesh-configurator", "--chain-concurrency", "0"]).is_err()
        );
    }

    #[test]
    fn test_keystore_wins_over_signer_key() {
        let cli = Cli::try_parse_from([
            "socket-mesh-configurator",
            "--signer-key",
            "ab",
            "--keystore",
            "operator.json",
        ])
        .unwrap();
        assert_eq!(
            cli.operator_key_source(),
            Some(OperatorKeySource::Keystore(Path::new("operator.json")))
        );
    }

    #[test]
    fn test_operator_key_source() {
        let cli = Cli::try_parse_from(["socket-mesh-configurator", "--signer-key", "ab"]).unwrap();
        assert_eq!(cli.operator_key_source(), Some(OperatorKeySource::Hex("ab")));

        let mut cli = cli;
        cli.signer_key = None;
        assert_eq!(cli.operator_key_source(), None);
    }
}
