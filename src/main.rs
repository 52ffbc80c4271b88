// src/main.rs

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Images(args) => commands::cmd_images(&args),
        Commands::Readyz(args) => {
            let code = commands::cmd_readyz(&args.status_path, &args.base_url)?;
            std::process::exit(code)
        }
        Commands::WaitPostgres(args) => {
            let code = commands::cmd_wait_postgres(args.attempts, args.interval_secs)?;
            std::process::exit(code)
        }
    }
}
