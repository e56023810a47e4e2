//! Workflow selection
//!
//! Callers name a workflow with a selector token; each token maps to the
//! configuration key holding the remote workflow identifier. Absent or
//! unrecognized selectors fall back to [`DEFAULT_WORKFLOW_KEY`].

use crate::broker::BrokerError;
use crate::config::ChatKitConfig;

/// Configuration key of the primary workflow
pub const DEFAULT_WORKFLOW_KEY: &str = "WORKFLOW_ID";

/// Selector token to configuration key
const SELECTORS: &[(&str, &str)] = &[("bananhot", "WORKFLOW_ID_BANANHOT")];

/// A workflow identifier together with the key it was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWorkflow {
    /// Configuration key consulted
    pub config_key: &'static str,
    /// Remote workflow identifier
    pub id: String,
}

/// Map a selector token to its configuration key
///
/// Matching is exact. Anything not in the table, including `None`, selects
/// the default workflow.
///
/// # Examples
///
/// ```
/// use chatgate::broker::workflow::{config_key_for, DEFAULT_WORKFLOW_KEY};
///
/// assert_eq!(config_key_for(Some("bananhot")), "WORKFLOW_ID_BANANHOT");
/// assert_eq!(config_key_for(Some("nubrace")), DEFAULT_WORKFLOW_KEY);
/// assert_eq!(config_key_for(None), DEFAULT_WORKFLOW_KEY);
/// ```
pub fn config_key_for(selector: Option<&str>) -> &'static str {
    selector
        .and_then(|token| SELECTORS.iter().find(|(t, _)| *t == token))
        .map(|(_, key)| *key)
        .unwrap_or(DEFAULT_WORKFLOW_KEY)
}

/// Every configuration key a workflow can be read from, default first
pub fn config_keys() -> impl Iterator<Item = &'static str> {
    std::iter::once(DEFAULT_WORKFLOW_KEY).chain(SELECTORS.iter().map(|(_, key)| *key))
}

/// Resolve the workflow identifier for a selector
///
/// # Errors
///
/// Returns [`BrokerError::Configuration`] naming the key when the selected
/// workflow has no identifier configured.
pub fn resolve(
    config: &ChatKitConfig,
    selector: Option<&str>,
) -> Result<ResolvedWorkflow, BrokerError> {
    let config_key = config_key_for(selector);
    match config.workflow(config_key) {
        Some(id) => Ok(ResolvedWorkflow {
            config_key,
            id: id.to_string(),
        }),
        None => Err(BrokerError::Configuration(format!(
            "{} not configured. Please add it to your configuration.",
            config_key
        ))),
    }
}
