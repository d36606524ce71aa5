//! Validity policies: deciding whether a reconstruction output is the secret.
//!
//! "The oracle returned something" and "the oracle returned the secret"
//! are different facts. A corrupted share frequently still decodes, just
//! to garbage, so every decoded output goes through a policy before it
//! counts as a success.
//!
//! - [`ValidityPolicy::ReferenceSecret`] compares against the plaintext.
//!   Only usable where the plaintext is already known (demo sessions).
//! - [`ValidityPolicy::Commitment`] compares the BLAKE3 digest of the
//!   output against a digest published when the secret was split. The
//!   verifier never holds the plaintext.
//! - [`ValidityPolicy::Plurality`] accepts the unique most frequent
//!   decoded output. It needs no side information but can blame the wrong
//!   node when corruption approaches the `N - K` bound, or when corrupted
//!   combinations happen to agree with each other.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::CoreError;
use crate::report::ReconstructionOutcome;

/// Length of a BLAKE3 commitment in bytes.
pub const COMMITMENT_LEN: usize = 32;

// ---------------------------------------------------------------------------
// Mode (configuration-facing)
// ---------------------------------------------------------------------------

/// Policy selector as it appears in configuration and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidityMode {
    /// Compare against the known plaintext.
    #[default]
    Reference,
    /// Compare against a BLAKE3 commitment.
    Commitment,
    /// Accept the unique most frequent output.
    Plurality,
}

impl ValidityMode {
    /// Lowercase identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Commitment => "commitment",
            Self::Plurality => "plurality",
        }
    }
}

impl fmt::Display for ValidityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reference" => Ok(Self::Reference),
            "commitment" => Ok(Self::Commitment),
            "plurality" => Ok(Self::Plurality),
            other => Err(format!("unknown validity mode: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Rule deciding which decoded outputs count as the secret.
#[derive(Clone)]
pub enum ValidityPolicy {
    /// Output must equal this plaintext. Zeroized on drop.
    ReferenceSecret(Zeroizing<String>),
    /// BLAKE3 digest of the output must equal this commitment.
    Commitment([u8; COMMITMENT_LEN]),
    /// Output must be the unique most frequent decoded value.
    Plurality,
}

// Never print the reference plaintext.
impl fmt::Debug for ValidityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReferenceSecret(_) => f.write_str("ReferenceSecret([REDACTED])"),
            Self::Commitment(c) => write!(
                f,
                "Commitment({})",
                data_encoding::HEXLOWER.encode(c.as_slice())
            ),
            Self::Plurality => f.write_str("Plurality"),
        }
    }
}

impl ValidityPolicy {
    /// Policy comparing against a known plaintext.
    #[must_use]
    pub fn reference(secret: &str) -> Self {
        Self::ReferenceSecret(Zeroizing::new(secret.to_owned()))
    }

    /// Policy comparing against the BLAKE3 commitment of `secret`.
    #[must_use]
    pub fn commitment_to(secret: &str) -> Self {
        Self::Commitment(*blake3::hash(secret.as_bytes()).as_bytes())
    }

    /// Policy from a published, hex-encoded commitment.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCommitment`] if `hex` is not valid hex
    /// or does not decode to exactly 32 bytes.
    pub fn from_commitment_hex(hex: &str) -> Result<Self, CoreError> {
        let bytes = data_encoding::HEXLOWER_PERMISSIVE
            .decode(hex.trim().as_bytes())
            .map_err(|e| CoreError::InvalidCommitment(e.to_string()))?;
        let commitment: [u8; COMMITMENT_LEN] = bytes.try_into().map_err(|v: Vec<u8>| {
            CoreError::InvalidCommitment(format!(
                "expected {COMMITMENT_LEN} bytes, got {}",
                v.len()
            ))
        })?;
        Ok(Self::Commitment(commitment))
    }

    /// Hex-encoded BLAKE3 commitment for `secret`, as published at split time.
    #[must_use]
    pub fn commitment_hex(secret: &str) -> String {
        blake3::hash(secret.as_bytes()).to_hex().to_string()
    }

    /// Which mode this policy implements.
    #[must_use]
    pub const fn mode(&self) -> ValidityMode {
        match self {
            Self::ReferenceSecret(_) => ValidityMode::Reference,
            Self::Commitment(_) => ValidityMode::Commitment,
            Self::Plurality => ValidityMode::Plurality,
        }
    }

    /// Fix the acceptance rule for one verification run.
    ///
    /// `outcomes` are the per-combination results; only
    /// [`ValidityPolicy::Plurality`] looks at them.
    pub fn verdict<'a, I>(&'a self, outcomes: I) -> Verdict<'a>
    where
        I: IntoIterator<Item = &'a ReconstructionOutcome>,
    {
        match self {
            Self::ReferenceSecret(secret) => Verdict::Reference(secret.as_str()),
            Self::Commitment(commitment) => Verdict::Commitment(commitment),
            Self::Plurality => Verdict::Value(plurality_value(outcomes)),
        }
    }
}

/// The decoded value held by strictly more combinations than any other.
#[allow(clippy::arithmetic_side_effects)]
fn plurality_value<'a, I>(outcomes: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a ReconstructionOutcome>,
{
    let mut counts: HashMap<&'a str, usize> = HashMap::new();
    for outcome in outcomes {
        if let ReconstructionOutcome::Decoded(value) = outcome {
            *counts.entry(value.as_str()).or_insert(0) += 1;
        }
    }
    let best = counts.values().copied().max()?;
    let mut leaders = counts.into_iter().filter(|&(_, n)| n == best);
    let (value, _) = leaders.next()?;
    // A tie means no value stands out.
    leaders.next().is_none().then_some(value)
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Acceptance rule resolved for a single verification run.
///
/// No `Debug`: the reference variant borrows the plaintext.
#[derive(Clone, Copy)]
pub enum Verdict<'a> {
    /// Accept outputs equal to the reference plaintext.
    Reference(&'a str),
    /// Accept outputs whose digest equals the commitment.
    Commitment(&'a [u8; COMMITMENT_LEN]),
    /// Accept outputs equal to this value; `None` accepts nothing.
    Value(Option<&'a str>),
}

impl Verdict<'_> {
    /// Whether `outcome` counts as a valid reconstruction.
    #[must_use]
    pub fn accepts(&self, outcome: &ReconstructionOutcome) -> bool {
        let ReconstructionOutcome::Decoded(candidate) = outcome else {
            return false;
        };
        match *self {
            // Only the digest comparison is constant-time; hashing is linear in
            // the candidate length.
            Self::Reference(secret) => {
                blake3::hash(candidate.as_bytes()) == blake3::hash(secret.as_bytes())
            }
            Self::Commitment(commitment) => {
                blake3::hash(candidate.as_bytes()) == blake3::Hash::from(*commitment)
            }
            Self::Value(value) => value.is_some_and(|v| v == candidate),
        }
    }
}
