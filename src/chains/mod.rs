//! Chain Registry
//!
//! Static description of the networks the configurator can drive: which chains
//! exist, which class (mainnet/testnet) they belong to, where their RPC endpoint
//! comes from, and which native switchboard variant governs each directed pair.
//!
//! The registry is built once at startup and shared read-only (`Arc<ChainRegistry>`).
//! Tests construct synthetic topologies with [`ChainRegistry::new`] and the
//! `with_*` builders instead of relying on the built-in table.

pub mod errors;
pub mod known;

pub use errors::ChainRegistryError;

use crate::switchboard::NativeSwitchboardVariant;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Protocol-level chain identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainSlug(pub u32);

impl ChainSlug {
    /// The slug as a plain integer
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ChainSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ChainSlug {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl FromStr for ChainSlug {
    type Err = ChainRegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| ChainRegistryError::InvalidSlug(s.to_string()))
    }
}

/// Mainnet and testnet chains are never siblings of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkClass {
    /// Production network
    Mainnet,
    /// Test network
    Testnet,
}

/// Network metadata for one chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainInfo {
    /// Chain identifier
    pub slug: ChainSlug,
    /// Human-readable network name (`arbitrum-goerli`)
    pub name: String,
    /// Mainnet or testnet
    pub class: NetworkClass,
    /// Environment variable holding the RPC endpoint (`ARBITRUM_GOERLI_RPC`)
    pub rpc_env: String,
}

impl ChainInfo {
    /// Describe a chain, deriving the RPC variable name from the network name.
    pub fn new(slug: ChainSlug, name: &str, class: NetworkClass) -> Self {
        Self {
            slug,
            name: name.to_string(),
            class,
            rpc_env: format!("{}_RPC", name.to_uppercase().replace('-', "_")),
        }
    }
}

/// Explicitly constructed chain registry.
#[derive(Debug, Clone, Default)]
pub struct ChainRegistry {
    /// Declared chains, in iteration order
    chains: Vec<ChainInfo>,
    /// Native switchboard variant per directed pair
    natives: HashMap<(ChainSlug, ChainSlug), NativeSwitchboardVariant>,
    /// RPC endpoints supplied on the command line
    rpc_overrides: HashMap<ChainSlug, Url>,
}

impl ChainRegistry {
    /// Empty registry (for synthetic topologies).
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every chain and native pair the protocol is deployed on.
    pub fn builtin() -> Self {
        let mut registry = known::chains()
            .into_iter()
            .fold(Self::new(), |registry, info| registry.with_chain(info));
        for (src, dst, variant) in known::native_pairs() {
            registry.natives.insert((src, dst), variant);
        }
        registry
    }

    /// Declare a chain. Re-declaring a slug replaces its metadata in place.
    pub fn with_chain(mut self, info: ChainInfo) -> Self {
        match self.chains.iter_mut().find(|c| c.slug == info.slug) {
            Some(existing) => *existing = info,
            None => self.chains.push(info),
        }
        self
    }

    /// Declare the native switchboard variant for `src → dst`.
    pub fn with_native(
        mut self,
        src: ChainSlug,
        dst: ChainSlug,
        variant: NativeSwitchboardVariant,
    ) -> Self {
        self.natives.insert((src, dst), variant);
        self
    }

    /// Pin the RPC endpoint of a chain, taking precedence over its environment variable.
    pub fn with_rpc_override(mut self, chain: ChainSlug, url: Url) -> Self {
        self.rpc_overrides.insert(chain, url);
        self
    }

    /// Declared chains in iteration order.
    pub fn chains(&self) -> impl Iterator<Item = &ChainInfo> {
        self.chains.iter()
    }

    /// Metadata for a chain.
    pub fn get(&self, chain: ChainSlug) -> Option<&ChainInfo> {
        self.chains.iter().find(|c| c.slug == chain)
    }

    /// Whether the chain is declared.
    pub fn is_declared(&self, chain: ChainSlug) -> bool {
        self.get(chain).is_some()
    }

    /// Every other declared chain of the same class. Empty for undeclared chains.
    pub fn siblings(&self, chain: ChainSlug) -> Vec<ChainSlug> {
        let Some(info) = self.get(chain) else {
            return Vec::new();
        };
        self.chains
            .iter()
            .filter(|c| c.class == info.class && c.slug != chain)
            .map(|c| c.slug)
            .collect()
    }

    /// Native switchboard variant declared for `src → dst`, if any.
    pub fn native_variant(
        &self,
        src: ChainSlug,
        dst: ChainSlug,
    ) -> Option<NativeSwitchboardVariant> {
        self.natives.get(&(src, dst)).copied()
    }

    /// Resolve the RPC endpoint for a chain: command-line override first, then the
    /// chain's environment variable.
    pub fn rpc_url(&self, chain: ChainSlug) -> Result<Url, ChainRegistryError> {
        if let Some(url) = self.rpc_overrides.get(&chain) {
            return Ok(url.clone());
        }
        let info = self.get(chain).ok_or(ChainRegistryError::UnknownChain(chain))?;
        let raw = std::env::var(&info.rpc_env).map_err(|_| ChainRegistryError::MissingRpc {
            chain,
            env: info.rpc_env.clone(),
        })?;
        Url::parse(&raw).map_err(|e| ChainRegistryError::InvalidRpcUrl {
            chain,
            reason: e.to_string(),
        })
    }
}

/// Parse a `--rpc <slug>=<url>` override.
pub fn parse_rpc_override(s: &str) -> Result<(ChainSlug, Url), ChainRegistryError> {
    let (slug, url) = s
        .split_once('=')
        .ok_or_else(|| ChainRegistryError::InvalidSlug(s.to_string()))?;
    let chain: ChainSlug = slug.parse()?;
    let url = Url::parse(url.trim()).map_err(|e| ChainRegistryError::InvalidRpcUrl {
        chain,
        reason: e.to_string(),
    })?;
    Ok((chain, url))
}

#[cfg(test)]
mod tests {
    use super::known::*;
    use super::*;

    #[test]
    fn test_builtin_siblings_stay_within_class() {
        let registry = ChainRegistry::builtin();

        let goerli_siblings = registry.siblings(GOERLI);
        assert_eq!(goerli_siblings.len(), 4);
        assert!(!goerli_siblings.contains(&GOERLI));
        assert!(goerli_siblings.contains(&ARBITRUM_GOERLI));
        assert!(!goerli_siblings.contains(&MAINNET));

        let mainnet_siblings = registry.siblings(MAINNET);
        assert_eq!(
            mainnet_siblings,
            vec![ARBITRUM, OPTIMISM, POLYGON_MAINNET, BSC]
        );
    }

    #[test]
    fn test_siblings_of_undeclared_chain_is_empty() {
        let registry = ChainRegistry::builtin();
        assert!(registry.siblings(ChainSlug(999_999)).is_empty());
    }

    #[test]
    fn test_builtin_native_variants() {
        let registry = ChainRegistry::builtin();
        assert_eq!(
            registry.native_variant(MAINNET, ARBITRUM),
            Some(NativeSwitchboardVariant::ArbitrumL1)
        );
        assert_eq!(
            registry.native_variant(ARBITRUM, MAINNET),
            Some(NativeSwitchboardVariant::ArbitrumL2)
        );
        assert_eq!(
            registry.native_variant(POLYGON_MUMBAI, GOERLI),
            Some(NativeSwitchboardVariant::PolygonL2)
        );
        assert_eq!(
            registry.native_variant(OPTIMISM_GOERLI, GOERLI),
            Some(NativeSwitchboardVariant::Optimism)
        );
        assert_eq!(registry.native_variant(BSC, MAINNET), None);
        assert_eq!(registry.native_variant(ARBITRUM, OPTIMISM), None);
    }

    #[test]
    fn test_rpc_env_name_derived_from_network_name() {
        let info = ChainInfo::new(ARBITRUM_GOERLI, "arbitrum-goerli", NetworkClass::Testnet);
        assert_eq!(info.rpc_env, "ARBITRUM_GOERLI_RPC");
        assert_eq!(info.class, NetworkClass::Testnet);
    }

    #[test]
    fn test_rpc_override_takes_precedence() {
        let url = Url::parse("http://localhost:8545").unwrap();
        let registry = ChainRegistry::builtin().with_rpc_override(GOERLI, url.clone());
        assert_eq!(registry.rpc_url(GOERLI).unwrap(), url);
    }

    #[test]
    fn test_rpc_url_unknown_chain() {
        let registry = ChainRegistry::new();
        match registry.rpc_url(ChainSlug(7)) {
            Err(ChainRegistryError::UnknownChain(slug)) => assert_eq!(slug, ChainSlug(7)),
            other => panic!("Expected UnknownChain, got {:?}", other),
        }
    }

    #[test]
    fn test_rpc_url_missing_env() {
        let registry = ChainRegistry::new().with_chain(ChainInfo::new(
            ChainSlug(31337),
            "configurator-test-missing",
            NetworkClass::Testnet,
        ));
        match registry.rpc_url(ChainSlug(31337)) {
            Err(ChainRegistryError::MissingRpc { env, .. }) => {
                assert_eq!(env, "CONFIGURATOR_TEST_MISSING_RPC")
            }
            other => panic!("Expected MissingRpc, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rpc_override() {
        let (chain, url) = parse_rpc_override("421613=https://rpc.example.org").unwrap();
        assert_eq!(chain, ARBITRUM_GOERLI);
        assert_eq!(url.as_str(), "https://rpc.example.org/");

        assert!(parse_rpc_override("421613").is_err());
        assert!(parse_rpc_override("abc=https://rpc.example.org").is_err());
        assert!(parse_rpc_override("5=not a url").is_err());
    }

    #[test]
    fn test_redeclaring_chain_replaces_metadata() {
        let registry = ChainRegistry::new()
            .with_chain(ChainInfo::new(ChainSlug(1), "one", NetworkClass::Mainnet))
            .with_chain(ChainInfo::new(ChainSlug(1), "uno", NetworkClass::Mainnet));
        assert_eq!(registry.chains().count(), 1);
        assert_eq!(registry.get(ChainSlug(1)).unwrap().name, "uno");
    }

    #[test]
    fn test_chain_slug_parse_and_display() {
        let slug: ChainSlug = " 80001 ".parse().unwrap();
        assert_eq!(slug, POLYGON_MUMBAI);
        assert_eq!(slug.to_string(), "80001");
        assert!("-1".parse::<ChainSlug>().is_err());
    }
}
