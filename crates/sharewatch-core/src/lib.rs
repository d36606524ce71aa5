//! `sharewatch-core`: pure share-verification logic for SHAREWATCH.
//!
//! This crate is the audit target: zero network, zero async.
//! Everything here is a deterministic function of its inputs; the
//! reconstruction oracle lives in `sharewatch-verifier`.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;

pub mod combinations;
pub mod shares;

pub mod validity;

pub mod report;
pub mod tally;

pub mod nuc;

pub use combinations::{binomial, combinations, Combinations};
pub use error::CoreError;
pub use nuc::aliases::AliasMap;
pub use nuc::{
    decode_envelope, token_chain, ChainItem, ChainItemKind, DecodedToken, TokenBody, TokenEnvelope,
    TokenHeader, TokenPayload,
};
pub use report::{
    assemble_report, AllSharesAttempt, CombinationResult, ReconstructionOutcome, Recovery,
    ReportStatus, VerificationReport, DECRYPTION_FAILED_MARKER, ERROR_MARKER,
};
pub use shares::{
    corrupt_share, node_label, SchemeParams, ShareSet, CORRUPTION_OFFSET, MAX_NODES,
    MIN_THRESHOLD,
};
pub use tally::{suspects, tally_nodes, NodeTally};
pub use validity::{ValidityMode, ValidityPolicy, Verdict};
