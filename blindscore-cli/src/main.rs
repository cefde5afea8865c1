use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

mod commands;
mod config;
mod input;
mod output;
mod secret;

#[derive(Parser)]
#[command(name = "blindscore")]
#[command(about = "Fraud scoring on encrypted transaction data")]
#[command(version)]
struct Cli {
    /// Output format
    #[arg(long, global = true)]
    json: bool,

    /// HE backend: "rlwe" (default), "mock" (testing only)
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Configuration file (default: ./blindscore.toml)
    #[arg(long, global = true, env = "BLINDSCORE_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true, env = "BLINDSCORE_DEBUG")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Act as the Data Owner
    Owner {
        #[command(subcommand)]
        action: commands::owner::OwnerCommand,
    },
    /// Act as the Compute Party: score the published input once
    Compute(commands::compute::ComputeArgs),
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("blindscore=debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("blindscore=info"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_timer(fmt::time::uptime())
        .init();

    let ctx = commands::Context {
        json_output: cli.json,
        backend_override: cli.backend,
        config: config::Config::load(cli.config.as_deref())?,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Owner { action } => commands::owner::run(action, &ctx).await,
        Commands::Compute(args) => commands::compute::run(args, &ctx)
            .await
            .map(|()| ExitCode::SUCCESS),
        Commands::Config { action } => {
            commands::config::run(action, &ctx).map(|()| ExitCode::SUCCESS)
        }
    }
}
