//! `demo`: split a secret, tamper with chosen nodes, analyze.

use std::collections::BTreeSet;

use serde::Serialize;
use sharewatch_core::{node_label, SchemeParams, ValidityMode, ValidityPolicy};
use sharewatch_verifier::{
    BlindfoldClient, ReconstructionOracle, SharingOracle, SharingSession, Verifier, VerifierConfig,
};

use super::ReportDto;
use crate::cli::DemoArgs;

/// Result of a demo run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoDto {
    pub validity: String,
    /// Published commitment, when the commitment policy is in use.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commitment: Option<String>,
    pub corrupted: Vec<String>,
    /// Shares as analyzed, including any corruption.
    pub shares: Vec<String>,
    pub report: ReportDto,
}

/// Convert a one-based node label to an index.
///
/// # Errors
///
/// Returns a string error if `label` is not in `1..=nodes`.
pub fn node_index(label: usize, nodes: usize) -> Result<usize, String> {
    label
        .checked_sub(1)
        .filter(|&index| index < nodes)
        .ok_or_else(|| format!("node {label} is out of range 1..={nodes}"))
}

/// Distinct node indices for `labels`, ascending.
///
/// # Errors
///
/// Returns a string error for the first label out of range.
pub fn node_indices(labels: &[usize], nodes: usize) -> Result<BTreeSet<usize>, String> {
    labels.iter().map(|&label| node_index(label, nodes)).collect()
}

fn corrupt_nodes<O>(
    session: &mut SharingSession<O>,
    labels: &[usize],
) -> Result<Vec<String>, String>
where
    O: ReconstructionOracle + SharingOracle + 'static,
{
    let nodes = session.params().nodes();
    let mut rng = rand::thread_rng();
    let mut corrupted = Vec::new();
    for index in node_indices(labels, nodes)? {
        if session
            .corrupt_share(index, &mut rng)
            .map_err(|e| e.to_string())?
        {
            corrupted.push(node_label(index));
        } else {
            tracing::warn!(node = index, "Share too short to corrupt, left unchanged");
        }
    }
    Ok(corrupted)
}

/// Run the demo against the configured oracle.
///
/// # Errors
///
/// Returns a string error for invalid parameters, an unreachable oracle
/// on split, or an out-of-range node label.
pub async fn run(config: &VerifierConfig, args: DemoArgs) -> Result<DemoDto, String> {
    let params = SchemeParams::new(args.nodes, args.threshold).map_err(|e| e.to_string())?;
    let client = BlindfoldClient::from_config(config).map_err(|e| e.to_string())?;
    let mode = args.validity.unwrap_or(config.validity);
    let mut session = SharingSession::new(Verifier::from_config(client, config), params, mode);

    session
        .store(&args.secret)
        .await
        .map_err(|e| format!("Failed to split secret: {e}"))?;
    let corrupted = corrupt_nodes(&mut session, &args.corrupt)?;

    let report = session.analyze().await.map_err(|e| e.to_string())?;
    let report = ReportDto::from(report);
    let shares = session
        .current_shares()
        .map(|s| s.as_slice().to_vec())
        .unwrap_or_default();

    Ok(DemoDto {
        validity: mode.as_str().to_owned(),
        commitment: (mode == ValidityMode::Commitment)
            .then(|| ValidityPolicy::commitment_hex(&args.secret)),
        corrupted,
        shares,
        report,
    })
}
