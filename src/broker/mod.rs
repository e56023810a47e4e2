//! Session broker
//!
//! Exchanges the server-held ChatKit API key for a short-lived client secret
//! bound to one workflow. The browser uses that secret to open its chat
//! transport directly with the remote service; this process is never in the
//! data path of the chat itself.
//!
//! # Flow
//!
//! 1. A non-empty current secret is returned unchanged, without a network
//!    call, so an open chat transport is not invalidated.
//! 2. Otherwise the API key is read, then the workflow identifier is resolved
//!    through [`workflow::resolve`]. Either missing yields
//!    [`BrokerError::Configuration`] before any request is sent.
//! 3. One call to [`ChatKitApi::create_session`] mints the secret, which is
//!    passed through unmodified.

pub mod client;
mod error;
pub mod workflow;

pub use client::{ChatKitApi, CreateSessionRequest, HttpChatKitClient, WorkflowRef};
pub use error::{BrokerError, ErrorBody};

use crate::config::ChatKitConfig;
use crate::error::Result;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A freshly minted credential and the workflow it is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSessionCredential {
    /// Opaque secret handed to the browser
    pub client_secret: String,
    /// Remote workflow identifier the secret is scoped to
    pub workflow_id: String,
}

/// Parsed body of a session request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRequest {
    /// Workflow selector token (`workflowId` on the wire)
    pub workflow_id: Option<String>,
    /// Secret the caller already holds (`currentSecret` on the wire)
    pub current_secret: Option<String>,
}

impl SessionRequest {
    /// Parse a request body leniently
    ///
    /// Empty or unparseable bodies are treated as `{}`. Fields of the wrong
    /// type are ignored, so a non-string `workflowId` selects the default
    /// workflow.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Internal`] when the body is valid JSON but not
    /// an object (for example `null`).
    ///
    /// # Examples
    ///
    /// ```
    /// use chatgate::broker::SessionRequest;
    ///
    /// let req = SessionRequest::from_body(br#"{"workflowId":"bananhot"}"#).unwrap();
    /// assert_eq!(req.workflow_id.as_deref(), Some("bananhot"));
    ///
    /// let req = SessionRequest::from_body(b"not json").unwrap();
    /// assert_eq!(req, SessionRequest::default());
    /// ```
    pub fn from_body(body: &[u8]) -> std::result::Result<Self, BrokerError> {
        let value: serde_json::Value = match serde_json::from_slice(body) {
            Ok(v) => v,
            Err(_) => return Ok(Self::default()),
        };

        let Some(obj) = value.as_object() else {
            return Err(BrokerError::Internal(
                "Malformed request body: expected a JSON object".to_string(),
            ));
        };

        let field = |name: &str| obj.get(name).and_then(|v| v.as_str()).map(str::to_string);
        Ok(Self {
            workflow_id: field("workflowId"),
            current_secret: field("currentSecret"),
        })
    }
}

/// Successful broker response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSecretResponse {
    /// Opaque client secret
    pub client_secret: String,
}

/// Mints workflow-scoped client secrets
pub struct SessionBroker {
    config: ChatKitConfig,
    api: Arc<dyn ChatKitApi>,
}

impl SessionBroker {
    /// Create a broker with an injected upstream client
    pub fn new(config: ChatKitConfig, api: Arc<dyn ChatKitApi>) -> Self {
        Self { config, api }
    }

    /// Create a broker talking to the configured session API over HTTP
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn from_config(config: &ChatKitConfig) -> Result<Self> {
        let api = HttpChatKitClient::new(config)?;
        Ok(Self::new(config.clone(), Arc::new(api)))
    }

    /// Return a client secret for the selected workflow
    ///
    /// A non-empty `current_secret` is returned as is.
    ///
    /// # Errors
    ///
    /// See [`SessionBroker::mint`].
    pub async fn client_secret(
        &self,
        selector: Option<&str>,
        current_secret: Option<&str>,
    ) -> std::result::Result<String, BrokerError> {
        if let Some(secret) = current_secret.filter(|s| !s.is_empty()) {
            tracing::debug!("Reusing caller-held client secret");
            return Ok(secret.to_string());
        }

        self.mint(selector).await.map(|c| c.client_secret)
    }

    /// Mint a new credential for the selected workflow
    ///
    /// # Errors
    ///
    /// - [`BrokerError::Configuration`] if the API key or the resolved
    ///   workflow identifier is missing; no request is sent
    /// - [`BrokerError::Upstream`] if the session API returns a non-success
    ///   status
    /// - [`BrokerError::Internal`] for any other fault
    pub async fn mint(
        &self,
        selector: Option<&str>,
    ) -> std::result::Result<ChatSessionCredential, BrokerError> {
        let api_key = self.config.api_key().ok_or_else(|| {
            BrokerError::Configuration("OPENAI_API_KEY not configured".to_string())
        })?;
        let resolved = workflow::resolve(&self.config, selector)?;

        let user = format!(
            "{}{}",
            self.config.user_prefix,
            chrono::Utc::now().timestamp_millis()
        );
        let request = CreateSessionRequest::new(resolved.id.clone(), user);

        tracing::info!(
            workflow_key = resolved.config_key,
            "Creating ChatKit session"
        );
        let client_secret = self.api.create_session(api_key, &request).await?;

        Ok(ChatSessionCredential {
            client_secret,
            workflow_id: resolved.id,
        })
    }
}

impl std::fmt::Debug for SessionBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBroker")
            .field("api_base", &self.config.api_base)
            .field("api_key_set", &self.config.api_key().is_some())
            .finish()
    }
}
