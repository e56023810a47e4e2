//! ChatKit session API client
//!
//! [`ChatKitApi`] is the seam between the broker and the network. The
//! production implementation, [`HttpChatKitClient`], issues one
//! `POST {api_base}/chatkit/sessions` per call.

use crate::broker::BrokerError;
use crate::config::ChatKitConfig;
use crate::error::{ChatgateError, Result};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request body for session creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateSessionRequest {
    /// Workflow the session is bound to
    pub workflow: WorkflowRef,
    /// Caller identity reported to the session API
    pub user: String,
}

/// Workflow reference inside [`CreateSessionRequest`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowRef {
    /// Remote workflow identifier
    pub id: String,
}

impl CreateSessionRequest {
    /// Build a request for the given workflow and user
    pub fn new(workflow_id: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            workflow: WorkflowRef {
                id: workflow_id.into(),
            },
            user: user.into(),
        }
    }
}

/// Response from the session creation endpoint
#[derive(Debug, Deserialize)]
struct CreateSessionResponse {
    #[serde(default)]
    client_secret: Option<String>,
}

/// Upstream session API abstraction
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatKitApi: Send + Sync {
    /// Create a session and return its client secret
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Upstream`] for non-success statuses and
    /// [`BrokerError::Internal`] for transport or decoding failures.
    async fn create_session(
        &self,
        api_key: &str,
        request: &CreateSessionRequest,
    ) -> std::result::Result<String, BrokerError>;
}

/// reqwest-backed [`ChatKitApi`]
#[derive(Debug, Clone)]
pub struct HttpChatKitClient {
    client: Client,
    endpoint: String,
    beta_header: String,
}

impl HttpChatKitClient {
    /// Create a client from ChatKit configuration
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use chatgate::broker::HttpChatKitClient;
    /// use chatgate::config::ChatKitConfig;
    ///
    /// let mut config = ChatKitConfig::default();
    /// config.api_base = "http://localhost:9000/v1/".to_string();
    /// let client = HttpChatKitClient::new(&config).unwrap();
    /// assert_eq!(client.endpoint(), "http://localhost:9000/v1/chatkit/sessions");
    /// ```
    pub fn new(config: &ChatKitConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("chatgate/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ChatgateError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let endpoint = format!("{}/chatkit/sessions", config.api_base.trim_end_matches('/'));
        tracing::info!("Initialized ChatKit client: endpoint={}", endpoint);

        Ok(Self {
            client,
            endpoint,
            beta_header: config.beta_header.clone(),
        })
    }

    /// Session creation URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatKitApi for HttpChatKitClient {
    async fn create_session(
        &self,
        api_key: &str,
        request: &CreateSessionRequest,
    ) -> std::result::Result<String, BrokerError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .header("OpenAI-Beta", &self.beta_header)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach ChatKit session API: {}", e);
                BrokerError::Internal(format!("Failed to reach ChatKit session API: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("ChatKit session API returned error {}: {}", status, body);
            return Err(BrokerError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CreateSessionResponse = response.json().await.map_err(|e| {
            BrokerError::Internal(format!("Failed to parse ChatKit session response: {}", e))
        })?;

        parsed
            .client_secret
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                BrokerError::Internal("ChatKit session response missing client_secret".to_string())
            })
    }
}
