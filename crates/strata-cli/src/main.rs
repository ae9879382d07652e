//! Strata command line interface
//!
//! Provisions datasets, RAW databases, spaces and access groups for one
//! platform project from a TOML bootstrap configuration.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{delete, deploy, plan, Session};

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Strata - IAM group and storage namespace bootstrapper", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Bootstrap configuration file
    #[arg(short, long, global = true, default_value = "strata.toml")]
    config: PathBuf,

    /// Platform state file; without it the run works on an empty in-memory platform
    #[arg(short, long, global = true)]
    state: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update every target resource and group
    Deploy {
        /// Log intended changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Seconds to wait before re-reading created datasets
        #[arg(long, default_value = "5")]
        settle_delay_secs: u64,
    },

    /// Deploy only the root group
    Prepare {
        /// Log intended changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete groups, RAW databases and spaces, deprecate datasets
    Delete {
        /// Log intended changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the target plan as JSON
    Plan,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let session = Session::open(&cli.config, cli.state.clone())?;
    match cli.command {
        Commands::Deploy {
            dry_run,
            settle_delay_secs,
        } => deploy::run(&session, dry_run, settle_delay_secs).await?,
        Commands::Prepare { dry_run } => deploy::run_prepare(&session, dry_run).await?,
        Commands::Delete { dry_run } => delete::run(&session, dry_run).await?,
        Commands::Plan => plan::run(&session).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_deploy_flags() {
        let cli = Cli::try_parse_from([
            "strata",
            "--config",
            "bootstrap.toml",
            "deploy",
            "--dry-run",
            "--settle-delay-secs",
            "0",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("bootstrap.toml"));
        assert!(cli.state.is_none());
        assert!(matches!(
            cli.command,
            Commands::Deploy {
                dry_run: true,
                settle_delay_secs: 0
            }
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["strata", "plan", "--state", "state.json", "-v"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.state, Some(PathBuf::from("state.json")));
        assert_eq!(cli.config, PathBuf::from("strata.toml"));
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Cli::try_parse_from(["strata", "destroy"]).is_err());
    }
}
