//! Error types for Chatgate
//!
//! This module defines the crate-wide error type, using `thiserror` for
//! ergonomic error handling. The session broker has its own narrower
//! taxonomy in [`crate::broker::BrokerError`], which converts into this one.

use thiserror::Error;

/// Main error type for Chatgate operations
///
/// This enum covers configuration loading, broker failures, identity
/// resolution, and the I/O and serialization errors that bubble up from
/// the HTTP client and server.
#[derive(Error, Debug)]
pub enum ChatgateError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session broker errors (missing settings, upstream rejections)
    #[error("Broker error: {0}")]
    Broker(#[from] crate::broker::BrokerError),

    /// Identity resolution errors (unauthenticated, malformed identity)
    #[error("Identity error: {0}")]
    Identity(String),

    /// Chat session errors seen by a chat client (broker unreachable or refusing)
    #[error("Chat session error: {0}")]
    Session(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Chatgate operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
