//! axum middleware applying an [`AccessGate`] to a route

use crate::gate::{AccessGate, Verdict};

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use std::sync::Arc;

/// Run one gate activation for the request
///
/// Authorized requests reach the wrapped handler; everything else is
/// redirected to the gate's home location with `303 See Other`. Nothing is
/// written to the caller until the activation settles.
///
/// # Examples
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use chatgate::gate::{require_page_access, AccessGate, HttpIdentityResolver};
/// use chatgate::config::IdentityConfig;
/// use std::sync::Arc;
///
/// let resolver = Arc::new(HttpIdentityResolver::new(&IdentityConfig::default()).unwrap());
/// let gate = Arc::new(AccessGate::new("csm", "/", resolver));
/// let app: Router = Router::new()
///     .route("/csm-dashboard", get(|| async { "dashboard" }))
///     .layer(middleware::from_fn_with_state(gate, require_page_access));
/// ```
pub async fn require_page_access(
    State(gate): State<Arc<AccessGate>>,
    request: Request,
    next: Next,
) -> Response {
    let cookie = request
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match gate.activate().resolve(cookie.as_deref()).await {
        Verdict::Authorized => next.run(request).await,
        Verdict::Redirected { location } => {
            tracing::debug!(slug = gate.slug(), "Redirecting to {}", location);
            Redirect::to(&location).into_response()
        }
    }
}
