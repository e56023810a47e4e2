//! Page registry
//!
//! Pages are identified by a stable slug, distinct from the route they are
//! served on. The registry maps slugs to paths and decides which pages an
//! identity sees in navigation.

use crate::config::PageConfig;
use crate::gate::Identity;

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Slug of the landing page; never gated, it is the redirect target
pub const HOME_SLUG: &str = "home";

/// Slug whose navigation entry also requires the superadmin flag
pub const ADMIN_SLUG: &str = "admin";

/// Slugs that would collide with built-in routes
const RESERVED_SLUGS: &[&str] = &["api", "health"];

fn slug_regex() -> &'static Regex {
    static SLUG: OnceLock<Regex> = OnceLock::new();
    SLUG.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9-]*$").expect("static slug pattern"))
}

/// Whether `slug` is lowercase alphanumerics and dashes, not starting with a dash
///
/// # Examples
///
/// ```
/// use chatgate::pages::is_valid_slug;
///
/// assert!(is_valid_slug("agentkit-chat-box"));
/// assert!(!is_valid_slug("Agent Chat"));
/// assert!(!is_valid_slug("-leading"));
/// ```
pub fn is_valid_slug(slug: &str) -> bool {
    slug_regex().is_match(slug)
}

/// Whether `slug` is taken by a built-in route
pub fn is_reserved_slug(slug: &str) -> bool {
    RESERVED_SLUGS.contains(&slug)
}

/// Route a slug is served on
///
/// # Examples
///
/// ```
/// use chatgate::pages::path_for;
///
/// assert_eq!(path_for("home"), "/");
/// assert_eq!(path_for("csm"), "/csm-dashboard");
/// assert_eq!(path_for("agentkit-chat-box"), "/agentkit-chat-box");
/// ```
pub fn path_for(slug: &str) -> String {
    match slug {
        HOME_SLUG => "/".to_string(),
        "csm" => "/csm-dashboard".to_string(),
        other => format!("/{}", other),
    }
}

/// A navigation entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisiblePage {
    /// Page slug
    pub slug: String,
    /// Display label
    pub label: String,
    /// Route the page is served on
    pub path: String,
}

/// Configured pages, in configuration order
#[derive(Debug, Clone, Default)]
pub struct PageRegistry {
    pages: Vec<PageConfig>,
}

impl PageRegistry {
    /// Build a registry from configured pages
    pub fn new(pages: Vec<PageConfig>) -> Self {
        Self { pages }
    }

    /// All pages
    pub fn pages(&self) -> &[PageConfig] {
        &self.pages
    }

    /// Pages served behind an access gate (everything except home)
    pub fn gated(&self) -> impl Iterator<Item = &PageConfig> {
        self.pages.iter().filter(|p| p.slug != HOME_SLUG)
    }

    /// Navigation entries visible to `identity`
    ///
    /// A page is visible when the identity's flag for its slug is true; the
    /// admin page additionally requires the superadmin flag.
    pub fn visible_to(&self, identity: &Identity) -> Vec<VisiblePage> {
        self.pages
            .iter()
            .filter(|p| identity.can_access(&p.slug))
            .filter(|p| p.slug != ADMIN_SLUG || identity.is_superadmin)
            .map(|p| VisiblePage {
                slug: p.slug.clone(),
                label: p.label.clone(),
                path: path_for(&p.slug),
            })
            .collect()
    }
}
