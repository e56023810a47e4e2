/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `serve` runs the HTTP server
- `mint` requests one client secret and prints it
- `check` reports what the configuration provides

Secrets and workflow identifiers are never printed by `check`; it only
reports whether each setting is present.
*/

use crate::config::Config;
use crate::error::{ChatgateError, Result};

// HTTP server command handler
pub mod serve {
    use super::*;
    use crate::server;

    /// Serve the portal until the process is stopped
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration (consumed)
    pub async fn run_serve(config: Config) -> Result<()> {
        tracing::info!(
            pages = config.pages.len(),
            identity_url = %config.identity.url,
            "Serving chatgate"
        );
        server::start_server(&config).await
    }
}

// One-shot session mint
pub mod mint {
    use super::*;
    use crate::broker::SessionBroker;

    /// Mint a client secret for `workflow` and print it to stdout
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration (consumed)
    /// * `workflow` - Workflow selector token, `None` for the default
    ///
    /// # Errors
    ///
    /// Returns the broker's error when the secret cannot be minted
    pub async fn run_mint(config: Config, workflow: Option<String>) -> Result<()> {
        let broker = SessionBroker::from_config(&config.chatkit)?;
        let credential = broker
            .mint(workflow.as_deref())
            .await
            .map_err(ChatgateError::from)?;

        tracing::debug!(workflow_id = %credential.workflow_id, "Minted client secret");
        println!("{}", credential.client_secret);
        Ok(())
    }

}

// Configuration report
pub mod check {
    use super::*;
    use crate::broker::workflow;
    use crate::pages::PageRegistry;

    /// What the loaded configuration provides
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct CheckReport {
        /// Whether the API key is set
        pub api_key_set: bool,
        /// Each workflow setting and whether it is set, default first
        pub workflows: Vec<(&'static str, bool)>,
        /// Number of configured pages
        pub pages: usize,
        /// Number of pages behind an access gate
        pub gated_pages: usize,
    }

    impl CheckReport {
        /// Whether every setting a session request may need is present
        pub fn is_complete(&self) -> bool {
            self.api_key_set && self.workflows.iter().all(|(_, set)| *set)
        }
    }

    /// Build a report for `config`
    pub fn report(config: &Config) -> CheckReport {
        let registry = PageRegistry::new(config.pages.clone());
        CheckReport {
            api_key_set: config.chatkit.api_key().is_some(),
            workflows: workflow::config_keys()
                .into_iter()
                .map(|key| (key, config.chatkit.workflow(key).is_some()))
                .collect(),
            pages: registry.pages().len(),
            gated_pages: registry.gated().count(),
        }
    }

    /// Print the configuration report
    ///
    /// Missing secrets are reported but do not fail the check; session
    /// requests surface them individually.
    pub fn run_check(config: &Config) -> Result<()> {
        let report = report(config);
        let status = |set: bool| if set { "set" } else { "missing" };

        println!("OPENAI_API_KEY: {}", status(report.api_key_set));
        for (key, set) in &report.workflows {
            println!("{}: {}", key, status(*set));
        }
        println!(
            "pages: {} ({} gated)",
            report.pages, report.gated_pages
        );

        if !report.is_complete() {
            tracing::warn!("Some session settings are missing; affected requests will fail");
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_report_on_empty_secrets() {
            let mut config = Config::default();
            config.chatkit.api_key = None;
            config.chatkit.workflows.clear();
            let report = report(&config);
            assert!(!report.api_key_set);
            assert_eq!(report.workflows[0], ("WORKFLOW_ID", false));
            assert!(!report.is_complete());
            assert_eq!(report.gated_pages, report.pages - 1);
        }

        #[test]
        fn test_report_complete() {
            let mut config = Config::default();
            config.chatkit.api_key = Some("sk-test".to_string());
            for key in workflow::config_keys() {
                config.chatkit.workflows.insert(key.to_string(), "wf".to_string());
            }
            assert!(report(&config).is_complete());
        }
    }
}
