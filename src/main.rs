//! Chatgate - ChatKit session broker and page access gate
//!
#![doc = "Main entry point for the chatgate server and tooling."]

use anyhow::Result;

use chatgate::cli::{Cli, Commands};
use chatgate::commands;
use chatgate::config::Config;
use chatgate::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse first so --verbose and --json-logs shape the subscriber
    let cli = Cli::parse_args();

    logging::init_logging(cli.verbose, cli.json_logs)?;

    // Load configuration
    let config = Config::load(&cli.config, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Serve { .. } => {
            // host/port overrides were applied by Config::load
            tracing::info!("Starting server");
            commands::serve::run_serve(config).await?;
            Ok(())
        }
        Commands::Mint { workflow } => {
            if let Some(w) = &workflow {
                tracing::debug!("Using workflow selector: {}", w);
            }
            commands::mint::run_mint(config, workflow).await?;
            Ok(())
        }
        Commands::Check => {
            commands::check::run_check(&config)?;
            Ok(())
        }
    }
}
