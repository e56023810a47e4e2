//! Chat client mount
//!
//! A [`ChatMount`] is the client side of the broker: it asks the broker for a
//! client secret once, then keeps offering the same secret for as long as
//! the mount lives. A mount is bound to one workflow selector at creation, so
//! its cached secret is never presented for a different workflow.

use crate::broker::{ClientSecretResponse, ErrorBody};
use crate::error::{ChatgateError, Result};

use reqwest::Client;
use serde_json::json;

const FALLBACK_ERROR: &str = "Failed to create session";

/// One chat UI mount
#[derive(Debug)]
pub struct ChatMount {
    client: Client,
    endpoint: String,
    selector: Option<String>,
    secret: Option<String>,
    last_error: Option<String>,
}

impl ChatMount {
    /// Create a mount talking to the broker at `endpoint`
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Full URL of the broker's session endpoint
    /// * `selector` - Workflow selector token, `None` for the default workflow
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use chatgate::chat::ChatMount;
    ///
    /// let mount = ChatMount::new("http://localhost:3000/api/chatkit/session", Some("bananhot")).unwrap();
    /// assert_eq!(mount.selector(), Some("bananhot"));
    /// assert!(mount.cached_secret().is_none());
    /// ```
    pub fn new(endpoint: impl Into<String>, selector: Option<&str>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| ChatgateError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            selector: selector.map(str::to_string),
            secret: None,
            last_error: None,
        })
    }

    /// Workflow selector this mount is bound to
    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    /// Secret currently held, if any
    pub fn cached_secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    /// Message of the most recent failure, for inline display
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Return the held secret, or fetch one from the broker
    ///
    /// # Errors
    ///
    /// Returns [`ChatgateError::Session`] with the broker's `error` message
    /// (or a generic message) when the broker cannot be reached or refuses.
    pub async fn client_secret(&mut self) -> Result<String> {
        if let Some(secret) = &self.secret {
            return Ok(secret.clone());
        }

        match self.fetch().await {
            Ok(secret) => {
                self.secret = Some(secret.clone());
                self.last_error = None;
                Ok(secret)
            }
            Err(message) => {
                tracing::warn!("Chat session request failed: {}", message);
                self.last_error = Some(message.clone());
                Err(ChatgateError::Session(message).into())
            }
        }
    }

    async fn fetch(&self) -> std::result::Result<String, String> {
        let body = match &self.selector {
            Some(selector) => json!({ "workflowId": selector }),
            None => json!({}),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .map(|b| b.error)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| FALLBACK_ERROR.to_string());
            return Err(message);
        }

        response
            .json::<ClientSecretResponse>()
            .await
            .map(|r| r.client_secret)
            .map_err(|e| e.to_string())
    }
}
