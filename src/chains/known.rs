use super::{ChainInfo, ChainSlug, NetworkClass};
use crate::switchboard::NativeSwitchboardVariant;

/// Ethereum goerli testnet
pub const GOERLI: ChainSlug = ChainSlug(5);
/// Arbitrum goerli testnet
pub const ARBITRUM_GOERLI: ChainSlug = ChainSlug(421613);
/// Optimism goerli testnet
pub const OPTIMISM_GOERLI: ChainSlug = ChainSlug(420);
/// Polygon mumbai testnet
pub const POLYGON_MUMBAI: ChainSlug = ChainSlug(80001);
/// BSC testnet
pub const BSC_TESTNET: ChainSlug = ChainSlug(97);
/// Ethereum mainnet
pub const MAINNET: ChainSlug = ChainSlug(1);
/// Arbitrum one
pub const ARBITRUM: ChainSlug = ChainSlug(42161);
/// Optimism mainnet
pub const OPTIMISM: ChainSlug = ChainSlug(10);
/// Polygon PoS mainnet
pub const POLYGON_MAINNET: ChainSlug = ChainSlug(137);
/// BNB smart chain
pub const BSC: ChainSlug = ChainSlug(56);

/// Every chain the configurator knows about, testnets first.
pub fn chains() -> Vec<ChainInfo> {
    use NetworkClass::{Mainnet, Testnet};

    [
        (GOERLI, "goerli", Testnet),
        (ARBITRUM_GOERLI, "arbitrum-goerli", Testnet),
        (OPTIMISM_GOERLI, "optimism-goerli", Testnet),
        (POLYGON_MUMBAI, "polygon-mumbai", Testnet),
        (BSC_TESTNET, "bsc-testnet", Testnet),
        (MAINNET, "mainnet", Mainnet),
        (ARBITRUM, "arbitrum", Mainnet),
        (OPTIMISM, "optimism", Mainnet),
        (POLYGON_MAINNET, "polygon-mainnet", Mainnet),
        (BSC, "bsc", Mainnet),
    ]
    .into_iter()
    .map(|(slug, name, class)| ChainInfo::new(slug, name, class))
    .collect()
}

/// Declared native switchboard for every (source, destination) pair that has one.
///
/// The L1 side of a rollup pair runs the `*L1` variant and the rollup side the
/// `*L2` variant; Optimism uses the same contract on both ends.
pub fn native_pairs() -> Vec<(ChainSlug, ChainSlug, NativeSwitchboardVariant)> {
    use NativeSwitchboardVariant::*;

    let mut pairs = Vec::new();
    for (l1, arbitrum, optimism, polygon) in [
        (GOERLI, ARBITRUM_GOERLI, OPTIMISM_GOERLI, POLYGON_MUMBAI),
        (MAINNET, ARBITRUM, OPTIMISM, POLYGON_MAINNET),
    ] {
        pairs.push((l1, arbitrum, ArbitrumL1));
        pairs.push((arbitrum, l1, ArbitrumL2));
        pairs.push((l1, optimism, Optimism));
        pairs.push((optimism, l1, Optimism));
        pairs.push((l1, polygon, PolygonL1));
        pairs.push((polygon, l1, PolygonL2));
    }
    pairs
}
