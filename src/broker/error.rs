//! Error types for the session broker.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while minting a client secret.
///
/// Every variant leaves the HTTP layer as a JSON [`ErrorBody`]; none of them
/// escape as a bare transport failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrokerError {
    /// A required server-side setting is missing. Never retried.
    #[error("{0}")]
    Configuration(String),

    /// The session API rejected or failed the request.
    #[error("upstream returned {status}: {body}")]
    Upstream {
        /// Status code returned by the session API
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Unexpected local fault (malformed input, transport failure).
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON body returned for broker failures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable summary
    pub error: String,
    /// Raw upstream error body, for upstream failures only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl BrokerError {
    /// Returns the HTTP status code for this error.
    ///
    /// - Configuration / Internal: 500
    /// - Upstream: the upstream's own status (502 if it is not a valid code)
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Configuration(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
        }
    }

    /// Build the response body for this error.
    ///
    /// Internal details are logged, not returned.
    #[must_use]
    pub fn body(&self) -> ErrorBody {
        match self {
            Self::Configuration(message) => ErrorBody {
                error: message.clone(),
                details: None,
            },
            Self::Upstream { body, .. } => ErrorBody {
                error: "Failed to create ChatKit session".to_string(),
                details: Some(body.clone()),
            },
            Self::Internal(_) => ErrorBody {
                error: "Internal server error".to_string(),
                details: None,
            },
        }
    }
}

impl IntoResponse for BrokerError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(detail) => tracing::error!("ChatKit session creation error: {}", detail),
            Self::Configuration(message) => tracing::error!("Broker misconfigured: {}", message),
            Self::Upstream { status, .. } => {
                tracing::warn!(status = *status, "Relaying ChatKit upstream failure")
            }
        }
        (self.status_code(), Json(self.body())).into_response()
    }
}
