//! Command-line interface definition for Chatgate
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands to serve the portal, mint a session, and check
//! configuration.

use clap::{Parser, Subcommand};

/// Chatgate - ChatKit session broker and page access gate
#[derive(Parser, Debug, Clone)]
#[command(name = "chatgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/chatgate.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "CHATGATE_JSON_LOGS")]
    pub json_logs: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Chatgate
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Override the bind host from config
        #[arg(long)]
        host: Option<String>,

        /// Override the bind port from config
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Mint one ChatKit client secret and print it
    Mint {
        /// Workflow selector token (e.g. bananhot); default workflow if omitted
        #[arg(short, long)]
        workflow: Option<String>,
    },

    /// Validate configuration and report which workflows are configured
    Check,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: "config/chatgate.yaml".to_string(),
            verbose: false,
            json_logs: false,
            command: Commands::Check,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, "config/chatgate.yaml");
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Commands::Check));
    }

    #[test]
    fn test_cli_parse_serve_with_overrides() {
        let cli = Cli::try_parse_from(["chatgate", "serve", "--host", "0.0.0.0", "-p", "8080"])
            .unwrap();
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host, Some("0.0.0.0".to_string()));
                assert_eq!(port, Some(8080));
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_mint_with_workflow() {
        let cli = Cli::try_parse_from(["chatgate", "mint", "--workflow", "bananhot"]).unwrap();
        match cli.command {
            Commands::Mint { workflow } => assert_eq!(workflow, Some("bananhot".to_string())),
            _ => panic!("Expected Mint command"),
        }
    }

    #[test]
    fn test_cli_parse_config_and_verbose() {
        let cli = Cli::try_parse_from(["chatgate", "-c", "custom.yaml", "-v", "check"]).unwrap();
        assert_eq!(cli.config, "custom.yaml");
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_rejects_bad_port() {
        assert!(Cli::try_parse_from(["chatgate", "serve", "--port", "99999"]).is_err());
    }
}
