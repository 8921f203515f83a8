//! Stake CLI - drive threshold pools and quorum safes from scenario files
//!
//! A scenario file funds a set of accounts, deploys one Pool, and scripts
//! contributions, clock advances, finalization, refunds and Safe approvals.
//! The run prints every step's outcome and the resulting ledger.

use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsString;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod output;
pub mod scenario;

pub use config::{AccountConfig, LoggingConfig, PoolSection, SafeSection, StakeConfig};
pub use error::{CliError, CliResult};

/// Stake CLI application
#[derive(Parser)]
#[command(name = "stake")]
#[command(about = "Threshold pool and quorum safe scenario runner", long_about = None)]
#[command(version)]
struct Cli {
    /// Scenario file path
    #[arg(short, long, env = "STAKE_CONFIG")]
    config: Option<String>,

    /// Log level, overriding the scenario's [logging] section
    #[arg(long, env = "STAKE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "STAKE_LOG_JSON")]
    json: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Report output format
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Run the scenario and print the report
    Run {
        /// Also write the final ledger state as JSON to this path
        #[arg(long)]
        export: Option<String>,
    },

    /// Validate the scenario file without running it
    Check,
}

/// Run using the process arguments.
pub fn run() -> CliResult<()> {
    run_with_args(std::env::args_os())
}

/// Run using the provided argument iterator.
pub fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    let config = StakeConfig::load(cli.config.as_deref())?;
    init_tracing(
        cli.log_level.as_deref().unwrap_or(&config.logging.level),
        cli.json || config.logging.json,
    );

    match cli.command {
        Commands::Check => {
            config.validate()?;
            output::print_check(&config);
            Ok(())
        }
        Commands::Run { export } => {
            config.validate()?;
            let (scenario, report) = scenario::run(&config)?;
            output::print_report(&report, cli.output)?;

            if let Some(path) = export {
                std::fs::write(&path, scenario.ledger().export_json()?)?;
                tracing::info!(path = %path, "Ledger state exported");
            }
            Ok(())
        }
    }
}

fn init_tracing(level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.to_string().into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
