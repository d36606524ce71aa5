//! Verification report and the single reducer that builds it.
//!
//! The orchestrator collects one [`ReconstructionOutcome`] per combination
//! (in any completion order) and hands them to [`assemble_report`].
//! Validity, tallies, suspects and recovery are all computed here, in one
//! place, after every result is in.

use serde::Serialize;

use crate::shares::SchemeParams;
use crate::tally::{suspects, tally_nodes, NodeTally};
use crate::validity::ValidityPolicy;

/// Result string recorded for a combination whose reconstruction failed.
pub const ERROR_MARKER: &str = "[ERROR]";

/// Result string recorded when the all-shares reconstruction failed.
pub const DECRYPTION_FAILED_MARKER: &str = "[DECRYPTION FAILED]";

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What a single oracle call produced.
///
/// Transport errors, bad status codes, malformed bodies and timeouts all
/// collapse into [`ReconstructionOutcome::Failed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconstructionOutcome {
    /// The oracle returned a candidate secret.
    Decoded(String),
    /// The oracle call failed.
    Failed {
        /// Human-readable failure cause.
        reason: String,
    },
}

impl ReconstructionOutcome {
    /// The decoded value, if any.
    #[must_use]
    pub fn decoded(&self) -> Option<&str> {
        match self {
            Self::Decoded(value) => Some(value),
            Self::Failed { .. } => None,
        }
    }

    /// The failure reason, if any.
    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Decoded(_) => None,
            Self::Failed { reason } => Some(reason),
        }
    }
}

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// One evaluated K-subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationResult {
    /// Node indices, ascending.
    pub nodes: Vec<usize>,
    /// Decoded output, or [`ERROR_MARKER`] on failure.
    pub result: String,
    /// Whether the validity policy accepted the output.
    pub valid: bool,
    /// Failure cause when the oracle call failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reconstruction from the full share set. Reported only; it never
/// feeds suspect detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllSharesAttempt {
    /// Decoded output, or [`DECRYPTION_FAILED_MARKER`] on failure.
    pub result: String,
    /// Whether the oracle returned a value at all.
    pub succeeded: bool,
    /// Whether the validity policy accepted the value.
    pub valid: bool,
    /// Failure cause when the oracle call failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Secret recovered from the first valid combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recovery {
    /// The recovered secret.
    pub secret: String,
    /// Node indices of the combination it came from.
    pub nodes: Vec<usize>,
}

/// Overall outcome of a verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// No suspects and the full share set reconstructs validly.
    Intact,
    /// A valid combination exists, but some node is suspect or the full
    /// share set does not reconstruct validly.
    Recovered,
    /// No combination reconstructs validly.
    Unrecoverable,
}

impl ReportStatus {
    /// Lowercase identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Intact => "intact",
            Self::Recovered => "recovered",
            Self::Unrecoverable => "unrecoverable",
        }
    }
}

/// Everything one verification run found out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    /// Scheme parameters the run used.
    pub params: SchemeParams,
    /// Reconstruction from all shares.
    pub all_shares: AllSharesAttempt,
    /// Every K-subset, in lexicographic order.
    pub combinations: Vec<CombinationResult>,
    /// Per-node counts, indexed by node.
    pub tallies: Vec<NodeTally>,
    /// Suspect nodes, ascending.
    pub suspects: Vec<usize>,
    /// First valid reconstruction, if any.
    pub recovery: Option<Recovery>,
    /// Summary classification.
    pub status: ReportStatus,
}

impl VerificationReport {
    /// Recovered secret, if any combination was valid.
    #[must_use]
    pub fn recovered_secret(&self) -> Option<&str> {
        self.recovery.as_ref().map(|r| r.secret.as_str())
    }

    /// Whether `node` is a suspect.
    #[must_use]
    pub fn is_suspect(&self, node: usize) -> bool {
        self.suspects.contains(&node)
    }

    /// Nodes cleared by a run that did find suspects.
    ///
    /// Empty when nothing is suspect: without a suspect there is nothing
    /// to be cleared of.
    #[must_use]
    pub fn cleared_nodes(&self) -> Vec<usize> {
        if self.suspects.is_empty() {
            return Vec::new();
        }
        self.tallies
            .iter()
            .map(|t| t.node)
            .filter(|n| !self.is_suspect(*n))
            .collect()
    }

    /// Number of combinations the policy accepted.
    #[must_use]
    pub fn valid_combination_count(&self) -> usize {
        self.combinations.iter().filter(|c| c.valid).count()
    }
}

// ---------------------------------------------------------------------------
// Reducer
// ---------------------------------------------------------------------------

/// Build the report from raw oracle outcomes.
///
/// `evaluated` may arrive in any order; it is sorted lexicographically by
/// node indices first, so the recovery choice is the minimum valid
/// combination regardless of which call finished first.
#[must_use]
pub fn assemble_report(
    params: SchemeParams,
    all_shares: &ReconstructionOutcome,
    mut evaluated: Vec<(Vec<usize>, ReconstructionOutcome)>,
    policy: &ValidityPolicy,
) -> VerificationReport {
    evaluated.sort_by(|(a, _), (b, _)| a.cmp(b));

    let verdict = policy.verdict(evaluated.iter().map(|(_, outcome)| outcome));
    let flags: Vec<bool> = evaluated
        .iter()
        .map(|(_, outcome)| verdict.accepts(outcome))
        .collect();
    let all_shares_valid = verdict.accepts(all_shares);

    let combinations: Vec<CombinationResult> = evaluated
        .into_iter()
        .zip(flags)
        .map(|((nodes, outcome), valid)| match outcome {
            ReconstructionOutcome::Decoded(result) => CombinationResult {
                nodes,
                result,
                valid,
                error: None,
            },
            ReconstructionOutcome::Failed { reason } => CombinationResult {
                nodes,
                result: ERROR_MARKER.into(),
                valid: false,
                error: Some(reason),
            },
        })
        .collect();

    let all_shares = match all_shares {
        ReconstructionOutcome::Decoded(result) => AllSharesAttempt {
            result: result.clone(),
            succeeded: true,
            valid: all_shares_valid,
            error: None,
        },
        ReconstructionOutcome::Failed { reason } => AllSharesAttempt {
            result: DECRYPTION_FAILED_MARKER.into(),
            succeeded: false,
            valid: false,
            error: Some(reason.clone()),
        },
    };

    let tallies = tally_nodes(params.nodes(), &combinations);
    let suspects = suspects(&tallies);
    let recovery = combinations.iter().find(|c| c.valid).map(|c| Recovery {
        secret: c.result.clone(),
        nodes: c.nodes.clone(),
    });

    let status = match (&recovery, suspects.is_empty() && all_shares.valid) {
        (None, _) => ReportStatus::Unrecoverable,
        (Some(_), true) => ReportStatus::Intact,
        (Some(_), false) => ReportStatus::Recovered,
    };

    VerificationReport {
        params,
        all_shares,
        combinations,
        tallies,
        suspects,
        recovery,
        status,
    }
}
