//! Configuration management for Chatgate
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//!
//! Secrets (the ChatKit API key and workflow identifiers) are usually
//! supplied through the environment rather than the YAML file. A missing
//! API key or workflow id is not a validation failure: the broker reports it
//! per request so the rest of the portal keeps serving.

use crate::broker::workflow;
use crate::error::{ChatgateError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Main configuration structure for Chatgate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream ChatKit session API settings
    #[serde(default)]
    pub chatkit: ChatKitConfig,

    /// Identity-resolution collaborator settings
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Pages known to the portal, each gated by its slug
    #[serde(default = "default_pages")]
    pub pages: Vec<PageConfig>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,

    /// Location denied requests are redirected to
    #[serde(default = "default_home_path")]
    pub home_path: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_home_path() -> String {
    "/".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            home_path: default_home_path(),
        }
    }
}

/// ChatKit session API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatKitConfig {
    /// Base URL of the session API (useful for tests and local mocks)
    ///
    /// Sessions are created at `{api_base}/chatkit/sessions`.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Server-held API key sent as a bearer credential
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Value of the `OpenAI-Beta` header required by the session API
    #[serde(default = "default_beta_header")]
    pub beta_header: String,

    /// Prefix for the anonymous user id attached to each session
    #[serde(default = "default_user_prefix")]
    pub user_prefix: String,

    /// Optional request timeout for the upstream call (seconds)
    ///
    /// `None` leaves timeout policy to the HTTP client defaults.
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,

    /// Workflow identifiers keyed by configuration key
    ///
    /// Keys are the names in [`crate::broker::workflow`], e.g. `WORKFLOW_ID`
    /// and `WORKFLOW_ID_BANANHOT`.
    #[serde(default, skip_serializing)]
    pub workflows: BTreeMap<String, String>,
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_beta_header() -> String {
    "chatkit_beta=v1".to_string()
}

fn default_user_prefix() -> String {
    "anonymous-user-".to_string()
}

impl Default for ChatKitConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            beta_header: default_beta_header(),
            user_prefix: default_user_prefix(),
            request_timeout_seconds: None,
            workflows: BTreeMap::new(),
        }
    }
}

impl ChatKitConfig {
    /// Look up a workflow identifier by configuration key
    ///
    /// Empty values count as absent.
    pub fn workflow(&self, key: &str) -> Option<&str> {
        self.workflows
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Return the API key if one is set and non-empty
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|v| !v.trim().is_empty())
    }
}

/// Identity-resolution collaborator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Endpoint returning the identity for the forwarded session cookie
    #[serde(default = "default_identity_url")]
    pub url: String,

    /// Optional request timeout (seconds)
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
}

fn default_identity_url() -> String {
    "http://localhost:3001/api/auth/me".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            url: default_identity_url(),
            request_timeout_seconds: None,
        }
    }
}

/// A page served by the portal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageConfig {
    /// Stable identifier used as the access-flag key
    pub slug: String,

    /// Display label for navigation
    pub label: String,

    /// Whether the page embeds the chat widget
    #[serde(default)]
    pub chat: bool,

    /// Workflow selector token passed to the broker by the embedded chat
    #[serde(default)]
    pub workflow: Option<String>,
}

impl PageConfig {
    fn new(slug: &str, label: &str, chat: bool, workflow: Option<&str>) -> Self {
        Self {
            slug: slug.to_string(),
            label: label.to_string(),
            chat,
            workflow: workflow.map(str::to_string),
        }
    }
}

fn default_pages() -> Vec<PageConfig> {
    vec![
        PageConfig::new("home", "Home", false, None),
        PageConfig::new("agentkit-chat-box", "Agent Chat", true, None),
        PageConfig::new("bananhot-chat", "BananHot Chat", true, Some("bananhot")),
        PageConfig::new("csm", "CSM Dashboard", false, None),
        PageConfig::new("admin", "Admin", false, None),
    ]
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            server: ServerConfig::default(),
            chatkit: ChatKitConfig::default(),
            identity: IdentityConfig::default(),
            pages: default_pages(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(ChatgateError::Io)?;
        let config = serde_yaml::from_str(&contents).map_err(ChatgateError::Yaml)?;
        tracing::debug!("Loaded configuration from {}", path);
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        // Secrets
        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            self.chatkit.api_key = Some(api_key);
            tracing::debug!("Env override: OPENAI_API_KEY");
        }

        for key in workflow::config_keys() {
            if let Ok(id) = std::env::var(key) {
                self.chatkit.workflows.insert(key.to_string(), id);
                tracing::debug!("Env override: {}", key);
            }
        }

        // Server overrides
        if let Ok(host) = std::env::var("CHATGATE_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("CHATGATE_PORT") {
            match port.parse::<u16>() {
                Ok(v) => {
                    self.server.port = v;
                    tracing::debug!(port = v, "Env override: CHATGATE_PORT");
                }
                Err(_) => {
                    tracing::warn!("Invalid value for CHATGATE_PORT: {}", port);
                }
            }
        }

        if let Ok(home) = std::env::var("CHATGATE_HOME_PATH") {
            self.server.home_path = home;
        }

        // Collaborator endpoints
        if let Ok(api_base) = std::env::var("CHATGATE_CHATKIT_API_BASE") {
            self.chatkit.api_base = api_base;
            tracing::debug!("Env override: CHATGATE_CHATKIT_API_BASE");
        }

        if let Ok(identity_url) = std::env::var("CHATGATE_IDENTITY_URL") {
            self.identity.url = identity_url;
            tracing::debug!("Env override: CHATGATE_IDENTITY_URL");
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let crate::cli::Commands::Serve { host, port } = &cli.command {
            if let Some(h) = host {
                self.server.host = h.clone();
            }
            if let Some(p) = port {
                self.server.port = *p;
            }
        }
    }

    /// Validate the configuration
    ///
    /// Ensures server settings are usable, collaborator URLs parse, and page
    /// slugs are well formed and unique.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(ChatgateError::Config("server.host cannot be empty".to_string()).into());
        }

        if self.server.port == 0 {
            return Err(
                ChatgateError::Config("server.port must be greater than 0".to_string()).into(),
            );
        }

        if !self.server.home_path.starts_with('/') {
            return Err(ChatgateError::Config(format!(
                "server.home_path must start with '/': {}",
                self.server.home_path
            ))
            .into());
        }

        if self.server.home_path.contains([':', '*']) {
            return Err(ChatgateError::Config(format!(
                "server.home_path cannot contain route parameters: {}",
                self.server.home_path
            ))
            .into());
        }

        if crate::server::BUILTIN_ROUTES.contains(&self.server.home_path.as_str()) {
            return Err(ChatgateError::Config(format!(
                "server.home_path collides with a built-in route: {}",
                self.server.home_path
            ))
            .into());
        }

        url::Url::parse(&self.chatkit.api_base).map_err(|e| {
            ChatgateError::Config(format!(
                "chatkit.api_base is not a valid URL ({}): {}",
                e, self.chatkit.api_base
            ))
        })?;

        url::Url::parse(&self.identity.url).map_err(|e| {
            ChatgateError::Config(format!(
                "identity.url is not a valid URL ({}): {}",
                e, self.identity.url
            ))
        })?;

        if matches!(self.chatkit.request_timeout_seconds, Some(0))
            || matches!(self.identity.request_timeout_seconds, Some(0))
        {
            return Err(ChatgateError::Config(
                "request_timeout_seconds must be greater than 0 when set".to_string(),
            )
            .into());
        }

        let mut seen = HashSet::new();
        let mut routes: HashMap<String, &str> = HashMap::new();
        for page in &self.pages {
            if !crate::pages::is_valid_slug(&page.slug) {
                return Err(
                    ChatgateError::Config(format!("Invalid page slug: {}", page.slug)).into(),
                );
            }
            if crate::pages::is_reserved_slug(&page.slug) {
                return Err(ChatgateError::Config(format!(
                    "Page slug collides with a built-in route: {}",
                    page.slug
                ))
                .into());
            }
            if !seen.insert(page.slug.as_str()) {
                return Err(
                    ChatgateError::Config(format!("Duplicate page slug: {}", page.slug)).into(),
                );
            }
            let path = crate::pages::path_for(&page.slug);
            if let Some(other) = routes.insert(path.clone(), page.slug.as_str()) {
                return Err(ChatgateError::Config(format!(
                    "Pages {} and {} are both served on {}",
                    other, page.slug, path
                ))
                .into());
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
