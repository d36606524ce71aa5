//! `sharewatch-verifier`: oracle-facing side of SHAREWATCH.
//!
//! Owns every piece of I/O: the blindfold HTTP client, the concurrent
//! verification fan-out, configuration files and the demo session. The
//! decisions themselves are made by `sharewatch-core`.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod blindfold;
pub mod config;
pub mod error;
pub mod oracle;
pub mod session;
pub mod verifier;

pub use blindfold::BlindfoldClient;
pub use config::VerifierConfig;
pub use error::VerifierError;
pub use oracle::{OracleError, ReconstructionOracle, SharingOracle};
pub use session::SharingSession;
pub use verifier::{Verifier, DEFAULT_CALL_TIMEOUT, DEFAULT_MAX_CONCURRENCY};
