//! Chatgate - ChatKit session broker and page access gate
//!
//! This library provides the server side of an internal chat portal: it
//! mints short-lived ChatKit client secrets for named workflows without
//! exposing the API key, and gates each page behind a per-page access flag
//! resolved from an external identity service.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `broker`: Workflow resolution and client secret minting
//! - `gate`: Identity resolution and the per-page access gate
//! - `pages`: Page slugs, routes, and navigation visibility
//! - `chat`: Client-side chat mount that requests and caches a secret
//! - `server`: axum router and HTTP handlers
//! - `views`: HTML shells for pages and the loading placeholder
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use chatgate::{Config, SessionBroker};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/chatgate.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let broker = SessionBroker::from_config(&config.chatkit)?;
//!     let secret = broker.client_secret(Some("bananhot"), None).await?;
//!     println!("{}", secret);
//!     Ok(())
//! }
//! ```

pub mod broker;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod gate;
pub mod logging;
pub mod pages;
pub mod server;
pub mod views;

// Re-export commonly used types
pub use broker::{BrokerError, SessionBroker};
pub use chat::ChatMount;
pub use config::Config;
pub use error::{ChatgateError, Result};
pub use gate::{AccessGate, GateState, Identity, Verdict};
pub use pages::PageRegistry;
