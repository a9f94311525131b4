//! Per-destination parameter values.
//!
//! ```json
//! {
//!   "421613": { "proposeGasLimit": 200000, "attestGasLimit": 180000, "executionOverhead": 350000 }
//! }
//! ```
//!
//! Destinations or fields that are not listed use the built-in defaults.

use crate::chains::ChainSlug;
use crate::constants::{
    DEFAULT_ATTEST_GAS_LIMIT, DEFAULT_EXECUTION_OVERHEAD, DEFAULT_PROPOSE_GAS_LIMIT,
};
use crate::params::ParameterKind;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading a limits file
#[derive(Debug, Error)]
pub enum LimitsError {
    #[error("failed to read limits file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed limits file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Overrides for one destination; unset fields fall back to the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DestinationLimits {
    pub propose_gas_limit: Option<u64>,
    pub attest_gas_limit: Option<u64>,
    pub execution_overhead: Option<u64>,
}

/// Resolved values for one destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedLimits {
    pub propose_gas_limit: u64,
    pub attest_gas_limit: u64,
    pub execution_overhead: u64,
}

impl ResolvedLimits {
    /// Value for one parameter kind.
    pub fn get(&self, kind: ParameterKind) -> u64 {
        match kind {
            ParameterKind::ProposeGasLimit => self.propose_gas_limit,
            ParameterKind::AttestGasLimit => self.attest_gas_limit,
            ParameterKind::ExecutionOverhead => self.execution_overhead,
        }
    }
}

/// Parameter values keyed by destination chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct LimitsConfig {
    destinations: BTreeMap<ChainSlug, DestinationLimits>,
}

impl LimitsConfig {
    /// Load a limits file. A malformed file is an error, never silently defaulted.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LimitsError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| LimitsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| LimitsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Values for `dst`.
    pub fn for_destination(&self, dst: ChainSlug) -> ResolvedLimits {
        let overrides = self.destinations.get(&dst).copied().unwrap_or_default();
        ResolvedLimits {
            propose_gas_limit: overrides.propose_gas_limit.unwrap_or(DEFAULT_PROPOSE_GAS_LIMIT),
            attest_gas_limit: overrides.attest_gas_limit.unwrap_or(DEFAULT_ATTEST_GAS_LIMIT),
            execution_overhead: overrides.execution_overhead.unwrap_or(DEFAULT_EXECUTION_OVERHEAD),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::test_utils::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let limits = LimitsConfig::default().for_destination(ChainSlug(420));
        assert_eq!(limits.get(ParameterKind::ProposeGasLimit), DEFAULT_PROPOSE_GAS_LIMIT);
        assert_eq!(limits.get(ParameterKind::AttestGasLimit), DEFAULT_ATTEST_GAS_LIMIT);
        assert_eq!(limits.get(ParameterKind::ExecutionOverhead), DEFAULT_EXECUTION_OVERHEAD);
    }

    #[test]
    fn test_partial_overrides() {
        let limits: LimitsConfig = serde_json::from_str(
            r#"{ "421613": { "proposeGasLimit": 200000 }, "420": { "executionOverhead": 1 } }"#,
        )
        .unwrap();

        let arb = limits.for_destination(ChainSlug(421613));
        assert_eq!(arb.propose_gas_limit, 200_000);
        assert_eq!(arb.attest_gas_limit, DEFAULT_ATTEST_GAS_LIMIT);

        let op = limits.for_destination(ChainSlug(420));
        assert_eq!(op.execution_overhead, 1);
        assert_eq!(op.propose_gas_limit, DEFAULT_PROPOSE_GAS_LIMIT);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("limits.json");
        std::fs::write(&path, r#"{ "5": { "attestGasLimit": 90000 } }"#).unwrap();

        let limits = LimitsConfig::load(&path).unwrap();
        assert_eq!(limits.for_destination(ChainSlug(5)).attest_gas_limit, 90_000);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("limits.json");
        std::fs::write(&path, r#"{ "5": { "attestGasLimt": 90000 } }"#).unwrap();
        assert!(matches!(LimitsConfig::load(&path), Err(LimitsError::Parse { .. })));

        assert!(matches!(
            LimitsConfig::load(dir.path().join("missing.json")),
            Err(LimitsError::Io { .. })
        ));
    }
}
