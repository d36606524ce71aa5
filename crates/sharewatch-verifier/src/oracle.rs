//! Oracle seams: the external service that splits and reconstructs secrets.
//!
//! Both traits return `Send` futures so the verifier can fan calls out
//! across tokio tasks.

use std::future::Future;

use sharewatch_core::SchemeParams;
use thiserror::Error;

/// Why a single oracle call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// Connection, TLS or body transfer failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx response.
    #[error("oracle returned status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error class reported by the oracle, if any.
        kind: Option<String>,
        /// Error message reported by the oracle.
        message: String,
    },

    /// 2xx response whose body does not match the expected schema.
    #[error("malformed oracle response: {0}")]
    MalformedResponse(String),

    /// The call did not finish within the configured time limit.
    #[error("oracle call timed out after {0} ms")]
    Timeout(u64),
}

/// Reconstructs a secret from a subset of shares.
pub trait ReconstructionOracle: Send + Sync {
    /// Reconstruct from `shares`, given in ascending node order.
    ///
    /// `params` describes the whole scheme (`N` and `K`), not the subset.
    fn reconstruct(
        &self,
        shares: Vec<String>,
        params: SchemeParams,
    ) -> impl Future<Output = Result<String, OracleError>> + Send;
}

/// Splits a secret into one share per node.
pub trait SharingOracle: Send + Sync {
    /// Split `secret` into `params.nodes()` shares.
    fn split(
        &self,
        secret: &str,
        params: SchemeParams,
    ) -> impl Future<Output = Result<Vec<String>, OracleError>> + Send;
}
