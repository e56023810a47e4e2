//! Access gate
//!
//! Wraps a protected view so it renders only for identities whose per-page
//! flag for the view's slug is `true`.
//!
//! Each activation is a small state machine:
//!
//! ```text
//! Pending --(flag true)-----------------------> Authorized
//!    \----(flag false/absent, any fault)-------> Redirected
//! ```
//!
//! Both right-hand states are terminal. Resolution consumes the
//! [`Activation`] and yields a [`Verdict`], which can only be one of the
//! terminal states, so an activation resolves at most once and a fresh
//! activation is needed for a fresh decision. Every fault during resolution
//! is treated exactly like an unauthenticated caller.
//!
//! Served over HTTP, the gate holds the response while `Pending`: nothing
//! is written until the verdict, so neither the page nor a redirect built
//! from partial data can reach the caller.

mod middleware;
mod resolver;

pub use middleware::require_page_access;
pub use resolver::{HttpIdentityResolver, IdentityResolver};

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// The resolved principal for the current session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Unique identifier (string or number on the wire)
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,

    /// Per-page access flags keyed by slug
    #[serde(default)]
    pub page_access: HashMap<String, bool>,

    /// Superadmin flag
    #[serde(default)]
    pub is_superadmin: bool,
}

impl Identity {
    /// Whether the identity's flag for `slug` is present and true
    ///
    /// # Examples
    ///
    /// ```
    /// use chatgate::gate::Identity;
    ///
    /// let mut identity = Identity::default();
    /// identity.page_access.insert("csm".to_string(), true);
    /// assert!(identity.can_access("csm"));
    /// assert!(!identity.can_access("admin"));
    /// ```
    pub fn can_access(&self, slug: &str) -> bool {
        self.page_access.get(slug).copied().unwrap_or(false)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

/// State of one gate activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    /// Resolution in flight; only the loading placeholder may render
    Pending,
    /// The wrapped view may render
    Authorized,
    /// The caller is sent to `location`; the view never renders
    Redirected {
        /// Redirect target
        location: String,
    },
}

impl GateState {
    /// Whether this state ends the activation
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GateState::Pending)
    }
}

/// Terminal outcome of an activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The wrapped view may render
    Authorized,
    /// The caller is sent to `location`
    Redirected {
        /// Redirect target
        location: String,
    },
}

impl From<Verdict> for GateState {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Authorized => GateState::Authorized,
            Verdict::Redirected { location } => GateState::Redirected { location },
        }
    }
}

/// Gate for a single page slug
pub struct AccessGate {
    slug: String,
    home: String,
    resolver: Arc<dyn IdentityResolver>,
}

impl AccessGate {
    /// Create a gate for `slug` that redirects denied callers to `home`
    pub fn new(
        slug: impl Into<String>,
        home: impl Into<String>,
        resolver: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self {
            slug: slug.into(),
            home: home.into(),
            resolver,
        }
    }

    /// Slug this gate checks
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Start a new activation in the `Pending` state
    pub fn activate(&self) -> Activation<'_> {
        Activation {
            gate: self,
            state: GateState::Pending,
        }
    }

    /// Decide the terminal state for a resolution outcome
    pub fn decide(&self, outcome: &crate::error::Result<Identity>) -> Verdict {
        match outcome {
            Ok(identity) if identity.can_access(&self.slug) => Verdict::Authorized,
            Ok(_) => {
                tracing::debug!(slug = %self.slug, "Access denied: page flag absent or false");
                self.redirect()
            }
            Err(e) => {
                tracing::debug!(slug = %self.slug, "Access denied: identity resolution failed: {}", e);
                self.redirect()
            }
        }
    }

    fn redirect(&self) -> Verdict {
        Verdict::Redirected {
            location: self.home.clone(),
        }
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("slug", &self.slug)
            .field("home", &self.home)
            .finish()
    }
}

/// One activation of an [`AccessGate`]
#[derive(Debug)]
pub struct Activation<'a> {
    gate: &'a AccessGate,
    state: GateState,
}

impl Activation<'_> {
    /// Current state; `Pending` until [`Activation::resolve`] runs
    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// Resolve the identity once and move to a terminal state
    ///
    /// Issues exactly one call to the identity resolver.
    pub async fn resolve(self, cookie: Option<&str>) -> Verdict {
        let outcome = self.gate.resolver.resolve(cookie).await;
        let verdict = self.gate.decide(&outcome);
        tracing::trace!(
            slug = %self.gate.slug,
            from = ?self.state,
            to = ?GateState::from(verdict.clone()),
            "Gate activation settled"
        );
        verdict
    }
}
