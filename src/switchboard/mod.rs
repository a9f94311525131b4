//! Switchboard Selector
//!
//! Decides which deployed switchboard governs a (source, destination) pair for an
//! integration type. Fast and optimistic switchboards are deployed once per chain
//! and shared by every sibling; native switchboards are per pair and exist only
//! where the chain registry declares a native variant.
//!
//! [`select`] is pure and total over declared pairs: anything it cannot resolve
//! comes back as [`SwitchboardSelection::Unsupported`], which callers report as a
//! skip rather than an error.

use crate::chains::{ChainRegistry, ChainSlug};
use crate::constants::roles;
use crate::ledger::ChainRecord;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How message validity is proven for a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IntegrationType {
    /// Attester-signed fast path
    #[serde(rename = "FAST", alias = "fast")]
    Fast,
    /// Optimistic path with a challenge window
    #[serde(rename = "OPTIMISTIC", alias = "optimistic")]
    Optimistic,
    /// The chain's own bridge or rollup messaging
    #[serde(rename = "NATIVE_BRIDGE", alias = "native")]
    Native,
}

impl IntegrationType {
    /// Integration types registered for every sibling unconditionally.
    pub const SHARED: [IntegrationType; 2] = [IntegrationType::Fast, IntegrationType::Optimistic];

    /// Ledger spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "FAST",
            Self::Optimistic => "OPTIMISTIC",
            Self::Native => "NATIVE_BRIDGE",
        }
    }

    /// Contract role of the chain-wide switchboard, `None` for per-pair native ones.
    pub fn contract_role(&self) -> Option<&'static str> {
        match self {
            Self::Fast => Some(roles::FAST_SWITCHBOARD),
            Self::Optimistic => Some(roles::OPTIMISTIC_SWITCHBOARD),
            Self::Native => None,
        }
    }
}

impl fmt::Display for IntegrationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chain-family specific native switchboard contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeSwitchboardVariant {
    /// Ethereum side of an Arbitrum pair
    ArbitrumL1,
    /// Arbitrum side of an Arbitrum pair
    ArbitrumL2,
    /// Either side of an Optimism pair
    Optimism,
    /// Ethereum side of a Polygon PoS pair (FxRoot)
    PolygonL1,
    /// Polygon side of a Polygon PoS pair (FxChild)
    PolygonL2,
}

impl NativeSwitchboardVariant {
    /// Canonical name (`ARBITRUM_L1`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ArbitrumL1 => "ARBITRUM_L1",
            Self::ArbitrumL2 => "ARBITRUM_L2",
            Self::Optimism => "OPTIMISM",
            Self::PolygonL1 => "POLYGON_L1",
            Self::PolygonL2 => "POLYGON_L2",
        }
    }
}

impl fmt::Display for NativeSwitchboardVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved switchboard for one pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchboardRef {
    /// Deployed switchboard on the source chain
    pub address: Address,
    /// Integration type it serves
    pub integration: IntegrationType,
    /// Native variant, set only for [`IntegrationType::Native`]
    pub variant: Option<NativeSwitchboardVariant>,
}

/// Why no switchboard governs a pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedReason {
    /// Source or destination is not in the chain registry
    UndeclaredChain(ChainSlug),
    /// A chain cannot be its own sibling
    SameChain,
    /// The chains belong to different network classes
    NotSiblings,
    /// The registry declares no native variant for the pair
    NoNativeVariant,
    /// The ledger has no native switchboard requested for the pair
    NoNativeConfig,
    /// The chain-wide switchboard is missing from the ledger
    MissingDeployment(&'static str),
}

impl fmt::Display for UnsupportedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndeclaredChain(chain) => write!(f, "chain {chain} is not declared"),
            Self::SameChain => f.write_str("source and destination are the same chain"),
            Self::NotSiblings => f.write_str("chains belong to different network classes"),
            Self::NoNativeVariant => f.write_str("no native switchboard declared for pair"),
            Self::NoNativeConfig => f.write_str("no native integration requested in ledger"),
            Self::MissingDeployment(role) => write!(f, "{role} not deployed"),
        }
    }
}

/// Outcome of [`select`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchboardSelection {
    /// The switchboard governing the pair
    Selected(SwitchboardRef),
    /// No switchboard applies; skip the pair
    Unsupported(UnsupportedReason),
}

/// Select the switchboard governing `src → dst` for `integration`.
///
/// `record` is the source chain's ledger record.
pub fn select(
    registry: &ChainRegistry,
    record: &ChainRecord,
    integration: IntegrationType,
    src: ChainSlug,
    dst: ChainSlug,
) -> SwitchboardSelection {
    use SwitchboardSelection::{Selected, Unsupported};

    let (Some(src_info), Some(dst_info)) = (registry.get(src), registry.get(dst)) else {
        let missing = if registry.is_declared(src) { dst } else { src };
        return Unsupported(UnsupportedReason::UndeclaredChain(missing));
    };
    if src == dst {
        return Unsupported(UnsupportedReason::SameChain);
    }
    if src_info.class != dst_info.class {
        return Unsupported(UnsupportedReason::NotSiblings);
    }

    match integration.contract_role() {
        Some(role) => match record.contract(role) {
            Some(address) => Selected(SwitchboardRef {
                address,
                integration,
                variant: None,
            }),
            None => Unsupported(UnsupportedReason::MissingDeployment(role)),
        },
        None => {
            let Some(variant) = registry.native_variant(src, dst) else {
                return Unsupported(UnsupportedReason::NoNativeVariant);
            };
            match record.integration(dst, IntegrationType::Native) {
                Some(config) => Selected(SwitchboardRef {
                    address: config.switchboard,
                    integration,
                    variant: Some(variant),
                }),
                None => Unsupported(UnsupportedReason::NoNativeConfig),
            }
        }
    }
}
