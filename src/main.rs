//! Flight Delay Monitor - Main Entry Point
//!
//! Cleaning, model selection, monitoring and single-flight prediction from the
//! command line.

use clap::Parser;
use flight_delay_monitor::cli::{
    cmd_clean, cmd_info, cmd_monitor, cmd_predict, cmd_train, Cli, Commands,
};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flight_delay_monitor=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Clean { source, output, timeout } => {
            cmd_clean(&source, &output, timeout)?;
        }
        Commands::Train { data, output, raw } => {
            cmd_train(&data, &output, raw)?;
        }
        Commands::Monitor(args) => {
            cmd_monitor(args)?;
        }
        Commands::Predict(args) => {
            cmd_predict(args)?;
        }
        Commands::Info { source } => {
            cmd_info(&source)?;
        }
    }

    Ok(())
}
