//! SHAREWATCH command-line shell.
//!
//! Parses arguments, loads configuration, sets up logging and hands off
//! to a command handler. Handlers return DTOs which are printed as JSON
//! on stdout; errors go to stderr with a non-zero exit status.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod cli;
pub mod commands;
pub mod logging;

use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use sharewatch_verifier::VerifierConfig;

use cli::{Cli, Commands};

fn to_json<T: Serialize>(dto: &T) -> Result<String, String> {
    serde_json::to_string_pretty(dto).map_err(|e| format!("Failed to serialize output: {e}"))
}

/// Run the CLI.
pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    let config = VerifierConfig::load(&cli.config).with_env_overrides();
    let _log_guard = logging::init(config.log_dir.as_deref());
    tracing::debug!(config = %cli.config.display(), oracle = %config.oracle_base_url, "Configuration loaded");

    let output = match cli.command {
        Commands::Demo(args) => commands::demo::run(&config, args)
            .await
            .and_then(|dto| to_json(&dto)),
        Commands::Verify(args) => commands::verify::run(&config, args)
            .await
            .and_then(|dto| to_json(&dto)),
        Commands::DecodeToken { token } => {
            commands::token::run(&token).and_then(|dto| to_json(&dto))
        }
    };

    match output {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
