//! Command-line driver for the fitcoin economy
//!
//! Runs one economy operation per process against a file-backed ledger and
//! prints the JSON result on stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fitcoin_economy::{Economy, OPERATION_NAMES};
use fitcoin_effects::{FilesystemLedgerHandler, RealRandomHandler};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

mod config;
mod retry;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "fitcoin")]
#[command(about = "Fitcoin - activity rewards and purchase contracts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = ".fitcoin/config.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Invoke an economy function with positional arguments
    Invoke {
        /// Function name, e.g. createMember or makePurchase
        function: String,

        /// Positional arguments
        args: Vec<String>,
    },

    /// Print the effective configuration
    Config,

    /// Show ledger statistics
    Stats,

    /// List the canonical function names
    Functions,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = CliConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    // Results go to stdout, so logs stay on stderr
    let log_level = if cli.verbose { "debug" } else { config.log_level.as_str() };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Invoke { function, args } => {
            let ledger = FilesystemLedgerHandler::open(config.ledger_path.clone())
                .await
                .with_context(|| format!("opening ledger {}", config.ledger_path.display()))?;
            let economy = Economy::new(ledger, RealRandomHandler::new(), config.economy.clone())?;
            let output =
                retry::invoke_with_retry(&economy, &function, &args, config.max_commit_attempts)
                    .await?;
            info!(function = %function, bytes = output.len(), "Invocation complete");

            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&output)?;
            writeln!(stdout)?;
        }

        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }

        Commands::Stats => {
            let ledger = FilesystemLedgerHandler::open(config.ledger_path.clone()).await?;
            let stats = ledger.stats().await;
            println!("ledger:  {}", ledger.path().display());
            println!("backend: {}", stats.backend_type);
            println!("head:    {}", stats.head);
            println!("keys:    {}", stats.key_count);
            println!("bytes:   {}", stats.total_size);
        }

        Commands::Functions => {
            for name in OPERATION_NAMES {
                println!("{name}");
            }
        }
    }

    Ok(())
}
