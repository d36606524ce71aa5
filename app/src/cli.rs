//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sharewatch_core::ValidityMode;

#[derive(Debug, Parser)]
#[command(name = "sharewatch")]
#[command(about = "Detect corrupted shares in a threshold secret-sharing cluster")]
#[command(version)]
pub struct Cli {
    /// Configuration file (JSON); defaults apply when it is missing
    #[arg(long, global = true, default_value = "sharewatch.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Split a secret through the oracle, corrupt some shares, analyze
    Demo(DemoArgs),

    /// Check a share set from a file against the oracle
    Verify(VerifyArgs),

    /// Decode a credential-token envelope into its chain
    DecodeToken {
        /// Envelope: base64url tokens joined by '/'
        token: String,
    },
}

#[derive(Debug, Args)]
pub struct DemoArgs {
    /// Secret to split
    #[arg(long)]
    pub secret: String,

    /// Number of nodes (shares)
    #[arg(long, default_value_t = 4)]
    pub nodes: usize,

    /// Shares needed to reconstruct
    #[arg(long, default_value_t = 3)]
    pub threshold: usize,

    /// Node to corrupt, 1-based; repeatable
    #[arg(long = "corrupt")]
    pub corrupt: Vec<usize>,

    /// Validity policy: reference | commitment | plurality
    #[arg(long)]
    pub validity: Option<ValidityMode>,
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// JSON file: an array of shares, or an object with a `shares` array
    #[arg(long)]
    pub shares: PathBuf,

    /// Shares needed to reconstruct
    #[arg(long)]
    pub threshold: usize,

    /// Hex BLAKE3 commitment published when the secret was split
    #[arg(long, required_unless_present = "plurality", conflicts_with = "plurality")]
    pub commitment: Option<String>,

    /// Accept the most frequent reconstruction instead of a commitment
    #[arg(long)]
    pub plurality: bool,
}
