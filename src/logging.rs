//! Logging setup
//!
//! Human-readable or JSON-formatted logs on stderr. Stdout is left to
//! command output (for example the secret printed by `mint`).

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "chatgate=debug"
    } else {
        "chatgate=info"
    }
}

/// Initialize the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `verbose`.
///
/// # Errors
///
/// Returns error if the filter directive is invalid or a subscriber is
/// already installed
///
/// # Examples
///
/// ```no_run
/// use chatgate::logging::init_logging;
///
/// init_logging(false, true).unwrap();
/// tracing::info!("ready");
/// ```
pub fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(verbose)))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        let layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(std::io::stderr);
        registry.with(layer).try_init()?;
    } else {
        let layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_writer(std::io::stderr);
        registry.with(layer).try_init()?;
    }

    Ok(())
}
