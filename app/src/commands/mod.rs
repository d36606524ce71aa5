//! Command handlers for the `sharewatch` CLI.
//!
//! Each handler returns a dedicated DTO with `#[serde(rename_all =
//! "camelCase")]`; nodes are shown by their one-based labels.

pub mod demo;
pub mod token;
pub mod verify;

use serde::Serialize;
use sharewatch_core::{node_label, VerificationReport};

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Report as printed by `demo` and `verify`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDto {
    pub status: String,
    pub nodes: usize,
    pub threshold: usize,
    pub all_shares: AllSharesDto,
    pub combinations: Vec<CombinationDto>,
    pub node_tallies: Vec<NodeTallyDto>,
    pub suspects: Vec<String>,
    pub recovery: Option<RecoveryDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllSharesDto {
    pub result: String,
    /// The oracle returned a value, valid or not.
    pub succeeded: bool,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationDto {
    pub nodes: Vec<String>,
    pub result: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTallyDto {
    pub node: String,
    pub successes: u64,
    pub failures: u64,
    pub suspect: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryDto {
    pub secret: String,
    pub nodes: Vec<String>,
}

// ── Conversions ────────────────────────────────────────────────────

fn labels(nodes: &[usize]) -> Vec<String> {
    nodes.iter().copied().map(node_label).collect()
}

impl From<&VerificationReport> for ReportDto {
    fn from(report: &VerificationReport) -> Self {
        Self {
            status: report.status.as_str().to_owned(),
            nodes: report.params.nodes(),
            threshold: report.params.threshold(),
            all_shares: AllSharesDto {
                result: report.all_shares.result.clone(),
                succeeded: report.all_shares.succeeded,
                valid: report.all_shares.valid,
                error: report.all_shares.error.clone(),
            },
            combinations: report
                .combinations
                .iter()
                .map(|c| CombinationDto {
                    nodes: labels(&c.nodes),
                    result: c.result.clone(),
                    valid: c.valid,
                    error: c.error.clone(),
                })
                .collect(),
            node_tallies: report
                .tallies
                .iter()
                .map(|t| NodeTallyDto {
                    node: node_label(t.node),
                    successes: t.successes,
                    failures: t.failures,
                    suspect: t.is_suspect(),
                })
                .collect(),
            suspects: labels(&report.suspects),
            recovery: report.recovery.as_ref().map(|r| RecoveryDto {
                secret: r.secret.clone(),
                nodes: labels(&r.nodes),
            }),
        }
    }
}
