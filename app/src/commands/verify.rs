//! `verify`: check a share set read from disk.

use std::path::Path;

use serde_json::Value;
use sharewatch_core::{ShareSet, ValidityPolicy};
use sharewatch_verifier::{BlindfoldClient, Verifier, VerifierConfig};

use super::ReportDto;
use crate::cli::VerifyArgs;

/// Read shares from `path`.
///
/// Accepts a bare JSON array or any object with a `shares` array (the
/// oracle's split response, or `demo` output).
///
/// # Errors
///
/// Returns a string error if the file cannot be read, is not JSON, has
/// no share array, or contains a blank share.
pub fn load_shares(path: &Path) -> Result<ShareSet, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .map_err(|e| format!("{} is not valid JSON: {e}", path.display()))?;
    let array = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => map
            .remove("shares")
            .ok_or_else(|| format!("{} has no `shares` field", path.display()))?,
        _ => return Err(format!("{} must hold a JSON array of shares", path.display())),
    };
    serde_json::from_value(array).map_err(|e| format!("Invalid share set: {e}"))
}

/// Build the validity policy from `--commitment` / `--plurality`.
///
/// # Errors
///
/// Returns a string error for a malformed commitment or when neither
/// option is given.
pub fn policy_from_args(
    commitment: Option<&str>,
    plurality: bool,
) -> Result<ValidityPolicy, String> {
    match (commitment, plurality) {
        (Some(hex), false) => ValidityPolicy::from_commitment_hex(hex).map_err(|e| e.to_string()),
        (None, true) => Ok(ValidityPolicy::Plurality),
        _ => Err("exactly one of --commitment or --plurality is required".into()),
    }
}

/// Verify the share file against the configured oracle.
///
/// # Errors
///
/// Returns a string error for unreadable input, an invalid policy, or a
/// threshold out of range for the share count.
pub async fn run(config: &VerifierConfig, args: VerifyArgs) -> Result<ReportDto, String> {
    let shares = load_shares(&args.shares)?;
    let policy = policy_from_args(args.commitment.as_deref(), args.plurality)?;
    let client = BlindfoldClient::from_config(config).map_err(|e| e.to_string())?;

    let report = Verifier::from_config(client, config)
        .verify(&shares, args.threshold, &policy)
        .await
        .map_err(|e| e.to_string())?;
    Ok(ReportDto::from(&report))
}
