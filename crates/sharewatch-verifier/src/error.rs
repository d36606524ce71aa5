//! Verifier error types.

use sharewatch_core::CoreError;
use thiserror::Error;

use crate::oracle::OracleError;

/// Errors surfaced by verification runs, sessions and configuration.
///
/// Per-combination oracle failures never appear here; they are recorded
/// in the report.
#[derive(Debug, Error)]
pub enum VerifierError {
    /// Share-set or parameter validation failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The sharing oracle could not split a secret.
    #[error("sharing oracle failed: {0}")]
    Oracle(#[from] OracleError),

    /// The sharing oracle returned the wrong number of shares.
    #[error("oracle returned {actual} shares, expected {expected}")]
    ShareCountMismatch {
        /// Node count requested.
        expected: usize,
        /// Shares actually returned.
        actual: usize,
    },

    /// Refused to split an empty secret.
    #[error("secret is empty")]
    EmptySecret,

    /// A session operation needs a stored share set.
    #[error("no share set stored")]
    NotStored,

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// File system failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
