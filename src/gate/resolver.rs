//! Identity resolution
//!
//! The identity collaborator owns sessions and cookies. This module only
//! asks it who the current caller is, forwarding the caller's `Cookie`
//! header verbatim.

use crate::config::IdentityConfig;
use crate::error::{ChatgateError, Result};
use crate::gate::Identity;

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Resolves the identity behind a request's cookies
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve the identity for the given `Cookie` header value
    ///
    /// # Errors
    ///
    /// Any error means "not authenticated" to callers; implementations do
    /// not need to distinguish network faults from explicit denials.
    async fn resolve(&self, cookie: Option<&str>) -> Result<Identity>;
}

/// Resolves identities through the `GET` identity endpoint
#[derive(Debug, Clone)]
pub struct HttpIdentityResolver {
    client: Client,
    url: String,
}

impl HttpIdentityResolver {
    /// Create a resolver from identity configuration
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &IdentityConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ChatgateError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    /// Identity endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl IdentityResolver for HttpIdentityResolver {
    async fn resolve(&self, cookie: Option<&str>) -> Result<Identity> {
        let mut request = self.client.get(&self.url);
        if let Some(cookie) = cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }

        let response = request.send().await.map_err(ChatgateError::Http)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChatgateError::Identity(format!(
                "identity endpoint returned {}",
                status
            ))
            .into());
        }

        let identity = response.json::<Identity>().await.map_err(|e| {
            ChatgateError::Identity(format!("malformed identity response: {}", e))
        })?;
        Ok(identity)
    }
}
