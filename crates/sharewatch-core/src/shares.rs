//! Share sets and threshold-scheme parameters.
//!
//! Shares are opaque strings: their internal encoding belongs to the
//! external sharing service. This module only enforces the structural
//! preconditions the verifier relies on.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combinations::binomial;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Smallest threshold a scheme may use.
pub const MIN_THRESHOLD: usize = 2;

/// Largest node count accepted. `C(16, 8) = 12_870` oracle calls is the
/// worst case this allows.
pub const MAX_NODES: usize = 16;

/// Character offset rewritten by [`corrupt_share`].
pub const CORRUPTION_OFFSET: usize = 10;

/// Replacement alphabet for [`corrupt_share`] (standard base64).
const BASE64_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

// ---------------------------------------------------------------------------
// Scheme parameters
// ---------------------------------------------------------------------------

/// Validated `(N, K)` pair: `MIN_THRESHOLD <= K <= N <= MAX_NODES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeParams {
    nodes: usize,
    threshold: usize,
}

impl SchemeParams {
    /// Validate and build scheme parameters.
    ///
    /// # Errors
    ///
    /// - [`CoreError::EmptyShareSet`] when `nodes == 0`
    /// - [`CoreError::TooManyNodes`] when `nodes > MAX_NODES`
    /// - [`CoreError::ThresholdTooSmall`] when `threshold < MIN_THRESHOLD`
    /// - [`CoreError::ThresholdExceedsNodes`] when `threshold > nodes`
    pub fn new(nodes: usize, threshold: usize) -> Result<Self, CoreError> {
        if nodes == 0 {
            return Err(CoreError::EmptyShareSet);
        }
        if nodes > MAX_NODES {
            return Err(CoreError::TooManyNodes {
                nodes,
                max: MAX_NODES,
            });
        }
        if threshold < MIN_THRESHOLD {
            return Err(CoreError::ThresholdTooSmall {
                threshold,
                min: MIN_THRESHOLD,
            });
        }
        if threshold > nodes {
            return Err(CoreError::ThresholdExceedsNodes { threshold, nodes });
        }
        Ok(Self { nodes, threshold })
    }

    /// Total node count `N`.
    #[must_use]
    pub const fn nodes(&self) -> usize {
        self.nodes
    }

    /// Threshold `K`.
    #[must_use]
    pub const fn threshold(&self) -> usize {
        self.threshold
    }

    /// Number of K-subsets, `C(N, K)`.
    #[must_use]
    pub const fn combination_count(&self) -> u64 {
        binomial(self.nodes, self.threshold)
    }

    /// Number of K-subsets containing any given node, `C(N-1, K-1)`.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)]
    pub const fn participations_per_node(&self) -> u64 {
        // nodes >= threshold >= 2, so both subtractions are in range.
        binomial(self.nodes - 1, self.threshold - 1)
    }
}

// ---------------------------------------------------------------------------
// Share set
// ---------------------------------------------------------------------------

/// Ordered, non-empty sequence of shares; index `i` belongs to node `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ShareSet {
    shares: Vec<String>,
}

impl ShareSet {
    /// Build a share set, rejecting empty sets and blank shares.
    ///
    /// # Errors
    ///
    /// - [`CoreError::EmptyShareSet`] if `shares` is empty
    /// - [`CoreError::TooManyNodes`] if there are more than `MAX_NODES` shares
    /// - [`CoreError::MalformedShare`] if any share is blank
    pub fn new(shares: Vec<String>) -> Result<Self, CoreError> {
        if shares.is_empty() {
            return Err(CoreError::EmptyShareSet);
        }
        if shares.len() > MAX_NODES {
            return Err(CoreError::TooManyNodes {
                nodes: shares.len(),
                max: MAX_NODES,
            });
        }
        if let Some(index) = shares.iter().position(|s| s.trim().is_empty()) {
            return Err(CoreError::MalformedShare {
                index,
                reason: "share is blank".into(),
            });
        }
        Ok(Self { shares })
    }

    /// Number of shares (nodes).
    #[must_use]
    pub fn len(&self) -> usize {
        self.shares.len()
    }

    /// Always `false` for a constructed set; present for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    /// Share held by `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.shares.get(index).map(String::as_str)
    }

    /// All shares in node order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.shares
    }

    /// Shares for `indices`, in the order given.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NodeOutOfRange`] for an index past the end.
    pub fn select(&self, indices: &[usize]) -> Result<Vec<String>, CoreError> {
        indices
            .iter()
            .map(|&index| {
                self.shares
                    .get(index)
                    .cloned()
                    .ok_or(CoreError::NodeOutOfRange {
                        index,
                        nodes: self.shares.len(),
                    })
            })
            .collect()
    }

    /// Replace the share held by `index`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NodeOutOfRange`] if `index` is past the end
    /// - [`CoreError::MalformedShare`] if `value` is blank
    pub fn replace(&mut self, index: usize, value: String) -> Result<(), CoreError> {
        let nodes = self.shares.len();
        let slot = self
            .shares
            .get_mut(index)
            .ok_or(CoreError::NodeOutOfRange { index, nodes })?;
        if value.trim().is_empty() {
            return Err(CoreError::MalformedShare {
                index,
                reason: "share is blank".into(),
            });
        }
        *slot = value;
        Ok(())
    }
}

impl TryFrom<Vec<String>> for ShareSet {
    type Error = CoreError;

    fn try_from(shares: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(shares)
    }
}

impl From<ShareSet> for Vec<String> {
    fn from(set: ShareSet) -> Self {
        set.shares
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Human-facing, one-based node label (`"Node 1"` for index `0`).
#[must_use]
pub fn node_label(index: usize) -> String {
    format!("Node {}", index.saturating_add(1))
}

/// Tamper with a share by swapping the character at [`CORRUPTION_OFFSET`]
/// for a different base64 character.
///
/// Returns `None` when the share is too short to have that character.
pub fn corrupt_share<R: Rng + ?Sized>(share: &str, rng: &mut R) -> Option<String> {
    let (pos, existing) = share.char_indices().nth(CORRUPTION_OFFSET)?;
    let choices: Vec<char> = BASE64_ALPHABET.chars().filter(|&c| c != existing).collect();
    let replacement = *choices.choose(rng)?;

    let tail = pos.checked_add(existing.len_utf8())?;
    let mut out = String::with_capacity(share.len());
    out.push_str(share.get(..pos)?);
    out.push(replacement);
    out.push_str(share.get(tail..)?);
    Some(out)
}
