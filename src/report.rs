//! Per-step results and the aggregated run report.
//!
//! Every driver step ends in exactly one [`StepStatus`]: a transaction was mined
//! (`Applied`), the target state was already in place (`Skipped`), or the step
//! failed. Failures are values carried up to the report; they never abort work
//! on other pairs.

use crate::chains::ChainSlug;
use crate::contracts::GatewayError;
use crate::params::ParameterKind;
use crate::switchboard::{IntegrationType, NativeSwitchboardVariant};
use alloy_primitives::{Address, B256};
use std::fmt;

/// What a step configures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Socket switchboard registration
    Register(IntegrationType),
    /// Attester role on the fast switchboard
    GrantAttester(Address),
    /// Native switchboard remote pointer; `None` when no variant is declared for the pair
    RemoteLink(Option<NativeSwitchboardVariant>),
    /// Signed parameter update on a registry contract
    Parameter {
        /// Parameter updated
        kind: ParameterKind,
        /// Contract role of the registry holding it
        registry: &'static str,
    },
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register(integration) => write!(f, "register {integration}"),
            Self::GrantAttester(attester) => write!(f, "grant attester {attester}"),
            Self::RemoteLink(Some(variant)) => write!(f, "link {variant}"),
            Self::RemoteLink(None) => f.write_str("link native"),
            Self::Parameter { kind, registry } => write!(f, "{kind} on {registry}"),
        }
    }
}

/// Result of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    /// A transaction was mined with a success status
    Applied {
        /// Mined transaction
        tx_hash: B256,
    },
    /// The target state was already in place; nothing was submitted
    Skipped {
        /// Why nothing was done
        reason: String,
    },
    /// The step failed
    Failed {
        /// Error text
        error: String,
        /// Whether a retry may succeed without any state change
        transient: bool,
    },
}

impl StepStatus {
    /// Skip with a reason.
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped { reason: reason.into() }
    }

    /// Terminal (non-retryable) failure.
    pub fn failed(error: impl fmt::Display) -> Self {
        Self::Failed {
            error: error.to_string(),
            transient: false,
        }
    }

    /// Failure of an external contract call.
    pub fn from_gateway(err: &GatewayError) -> Self {
        Self::Failed {
            error: err.to_string(),
            transient: err.is_transient(),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// A step result with the pair it ran for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// Source chain
    pub chain: ChainSlug,
    /// Sibling (destination) chain
    pub sibling: ChainSlug,
    /// What the step configures
    pub step: StepKind,
    /// How it ended
    pub status: StepStatus,
}

impl StepOutcome {
    pub fn new(chain: ChainSlug, sibling: ChainSlug, step: StepKind, status: StepStatus) -> Self {
        Self {
            chain,
            sibling,
            step,
            status,
        }
    }
}

/// Every step outcome of a run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Outcomes in completion order
    pub outcomes: Vec<StepOutcome>,
    /// Chains whose loop stopped early, with the reason
    pub chain_errors: Vec<(ChainSlug, String)>,
}

impl RunReport {
    pub fn push(&mut self, outcome: StepOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn extend(&mut self, outcomes: impl IntoIterator<Item = StepOutcome>) {
        self.outcomes.extend(outcomes);
    }

    /// Merge another report (one chain's loop) into this one.
    pub fn merge(&mut self, other: RunReport) {
        self.outcomes.extend(other.outcomes);
        self.chain_errors.extend(other.chain_errors);
    }

    pub fn applied(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_applied()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_skipped()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_failed()).count()
    }

    /// Failed steps, in completion order.
    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes.iter().filter(|o| o.status.is_failed())
    }

    /// Whether every step converged and every chain loop ran to the end.
    pub fn is_clean(&self) -> bool {
        self.failed() == 0 && self.chain_errors.is_empty()
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(sibling: u32, status: StepStatus) -> StepOutcome {
        StepOutcome::new(
            ChainSlug(5),
            ChainSlug(sibling),
            StepKind::Register(IntegrationType::Fast),
            status,
        )
    }

    #[test]
    fn test_counts() {
        let mut report = RunReport::default();
        report.push(outcome(420, StepStatus::Applied { tx_hash: B256::ZERO }));
        report.push(outcome(421613, StepStatus::skipped("already registered")));
        report.push(outcome(80001, StepStatus::failed("execution reverted")));

        assert_eq!(report.applied(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_clean());
        assert_eq!(report.failures().next().unwrap().sibling, ChainSlug(80001));
    }

    #[test]
    fn test_gateway_failure_keeps_transient_flag() {
        let transient = StepStatus::from_gateway(&GatewayError::Transport("timeout".into()));
        let terminal = StepStatus::from_gateway(&GatewayError::Reverted { tx_hash: B256::ZERO });
        assert!(matches!(transient, StepStatus::Failed { transient: true, .. }));
        assert!(matches!(terminal, StepStatus::Failed { transient: false, .. }));
    }

    #[test]
    fn test_chain_error_makes_report_unclean() {
        let mut report = RunReport::default();
        report.push(outcome(420, StepStatus::skipped("already registered")));
        assert!(report.is_clean());

        let mut other = RunReport::default();
        other.chain_errors.push((ChainSlug(420), "no RPC endpoint".into()));
        report.merge(other);
        assert!(!report.is_clean());
    }
}
