//! Main CLI application structure

use std::env;
use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::calendar_cmd::{self, CalendarCommands};
use super::output::{Output, OutputFormat};
use super::{check, resolve};
use crate::storage::Config;

#[derive(Parser)]
#[command(name = "autosched")]
#[command(author, version, about = "Automatic scheduling for hierarchical, related work items")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the configured one)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Configuration file (skips discovery)
    #[arg(long, short = 'c', global = true, env = "AUTOSCHED_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a request file and print the resulting changes
    Resolve {
        /// Request JSON: snapshot, trigger and optional calendar
        request: PathBuf,

        /// Print the snapshot with the changes applied instead
        #[arg(long)]
        commit: bool,
    },

    /// Validate a snapshot file
    Check {
        /// Snapshot JSON
        snapshot: PathBuf,
    },

    /// Query the working-day calendar
    #[command(subcommand)]
    Calendar(CalendarCommands),
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    let format = cli.format.unwrap_or_else(|| config.output.format.into());
    let output = Output::new(format);

    debug!(source = ?config.source, "configuration ready");

    match cli.command {
        Commands::Resolve { request, commit } => resolve::run(&output, &config, &request, commit)?,
        Commands::Check { snapshot } => check::run(&output, &config, &snapshot)?,
        Commands::Calendar(cmd) => calendar_cmd::run(cmd, &output, &config)?,
    }

    debug!("command completed");
    Ok(())
}

/// Logs go to stderr so stdout stays parseable
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("AUTOSCHED_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "autosched=debug,info"
        } else {
            "autosched=warn,error"
        })
    });

    let format = env::var("AUTOSCHED_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_negative_shift() {
        let cli = Cli::try_parse_from(["autosched", "calendar", "shift", "2025-01-06", "-3"]).unwrap();
        match cli.command {
            Commands::Calendar(CalendarCommands::Shift { days, all_days, .. }) => {
                assert_eq!(days, -3);
                assert!(!all_days);
            }
            _ => panic!("expected calendar shift"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "autosched",
            "resolve",
            "request.json",
            "--commit",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(matches!(cli.command, Commands::Resolve { commit: true, .. }));
    }
}
