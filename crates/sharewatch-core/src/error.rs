//! Core error types for `sharewatch-core`.

use thiserror::Error;

/// Errors produced by share-set validation and token decoding.
///
/// Reconstruction failures are *not* errors at this level: they are
/// captured per combination as [`crate::ReconstructionOutcome::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The share set contains no shares at all.
    #[error("share set is empty")]
    EmptyShareSet,

    /// A share is missing (blank) or otherwise unusable.
    #[error("malformed share at node {index}: {reason}")]
    MalformedShare {
        /// Zero-based node index of the offending share.
        index: usize,
        /// Why the share was rejected.
        reason: String,
    },

    /// Threshold below the scheme minimum.
    #[error("threshold {threshold} is below the minimum of {min}")]
    ThresholdTooSmall {
        /// Requested threshold.
        threshold: usize,
        /// Smallest accepted threshold.
        min: usize,
    },

    /// Threshold larger than the number of nodes.
    #[error("threshold {threshold} exceeds node count {nodes}")]
    ThresholdExceedsNodes {
        /// Requested threshold.
        threshold: usize,
        /// Number of nodes (shares) available.
        nodes: usize,
    },

    /// Node count above the supported maximum.
    #[error("{nodes} nodes exceeds the supported maximum of {max}")]
    TooManyNodes {
        /// Requested node count.
        nodes: usize,
        /// Largest accepted node count.
        max: usize,
    },

    /// A node index outside `0..nodes`.
    #[error("node index {index} out of range for {nodes} nodes")]
    NodeOutOfRange {
        /// Offending index.
        index: usize,
        /// Number of nodes.
        nodes: usize,
    },

    /// A hex-encoded commitment could not be parsed.
    #[error("invalid commitment: {0}")]
    InvalidCommitment(String),

    /// Credential-token envelope decoding failure.
    #[error("token decode error: {0}")]
    TokenDecode(String),
}
