//! HTTP surface
//!
//! Routes:
//!
//! - `POST /api/chatkit/session` mints or reuses a ChatKit client secret
//! - `GET /api/pages/visible` lists navigation entries for the caller
//! - `GET /health` reports liveness
//! - `GET <home_path>` serves the landing page (never gated)
//! - `GET <page path>` serves each configured page behind its access gate

use crate::broker::{BrokerError, ClientSecretResponse, SessionBroker, SessionRequest};
use crate::config::Config;
use crate::error::{ChatgateError, Result};
use crate::gate::{require_page_access, AccessGate, HttpIdentityResolver, IdentityResolver};
use crate::pages::{path_for, PageRegistry};
use crate::views;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;

/// Broker endpoint
pub const SESSION_ROUTE: &str = "/api/chatkit/session";

/// Navigation listing for the current caller
pub const VISIBLE_PAGES_ROUTE: &str = "/api/pages/visible";

/// Liveness probe
pub const HEALTH_ROUTE: &str = "/health";

/// Routes no page or home path may take
pub const BUILTIN_ROUTES: &[&str] = &[SESSION_ROUTE, VISIBLE_PAGES_ROUTE, HEALTH_ROUTE];

/// Shared state for API and home handlers
#[derive(Clone)]
pub struct AppState {
    /// Session broker
    pub broker: Arc<SessionBroker>,
    /// Identity collaborator
    pub resolver: Arc<dyn IdentityResolver>,
    /// Configured pages
    pub pages: Arc<PageRegistry>,
    /// Landing page path and redirect target
    pub home_path: String,
}

impl AppState {
    /// Build state from configuration with HTTP-backed collaborators
    ///
    /// # Errors
    ///
    /// Returns error if an HTTP client cannot be built
    pub fn from_config(config: &Config) -> Result<Self> {
        let resolver = HttpIdentityResolver::new(&config.identity)?;
        tracing::info!("Resolving identities through {}", resolver.url());
        Ok(Self {
            broker: Arc::new(SessionBroker::from_config(&config.chatkit)?),
            resolver: Arc::new(resolver),
            pages: Arc::new(PageRegistry::new(config.pages.clone())),
            home_path: config.server.home_path.clone(),
        })
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route(SESSION_ROUTE, post(create_session))
        .route(VISIBLE_PAGES_ROUTE, get(visible_pages))
        .route(&state.home_path, get(home));
    if state.home_path != "/" {
        app = app.route("/", get(home));
    }

    let page_routes = page_routes(&state);
    app.with_state(state)
        .merge(page_routes)
        .merge(health_routes())
}

fn health_routes() -> Router {
    Router::new().route(HEALTH_ROUTE, get(health_check))
}

/// One gated route per configured page except home
fn page_routes(state: &AppState) -> Router {
    let mut routes = Router::new();
    for page in state.pages.gated() {
        let path = path_for(&page.slug);
        if path == state.home_path || path == "/" {
            tracing::warn!(slug = %page.slug, path = %path, "Page path collides with home; not served");
            continue;
        }

        let html: Arc<str> = views::page(page, &state.home_path).into();
        let gate = Arc::new(AccessGate::new(
            page.slug.clone(),
            state.home_path.clone(),
            Arc::clone(&state.resolver),
        ));
        tracing::debug!(slug = %page.slug, path = %path, "Registering gated page");

        let page_router = Router::new()
            .route(
                &path,
                get(move || {
                    let html = Arc::clone(&html);
                    async move { Html(html.to_string()) }
                }),
            )
            .route_layer(middleware::from_fn_with_state(gate, require_page_access));
        routes = routes.merge(page_router);
    }
    routes
}

async fn create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> std::result::Result<Json<ClientSecretResponse>, BrokerError> {
    let request = SessionRequest::from_body(&body)?;
    let client_secret = state
        .broker
        .client_secret(
            request.workflow_id.as_deref(),
            request.current_secret.as_deref(),
        )
        .await?;
    Ok(Json(ClientSecretResponse { client_secret }))
}

fn cookie(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::COOKIE).and_then(|v| v.to_str().ok())
}

async fn visible_pages(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match state.resolver.resolve(cookie(&headers)).await {
        Ok(identity) => Json(state.pages.visible_to(&identity)).into_response(),
        Err(e) => {
            tracing::debug!("Visible pages requested without identity: {}", e);
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Not authenticated" })),
            )
                .into_response()
        }
    }
}

async fn home(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let nav = state
        .resolver
        .resolve(cookie(&headers))
        .await
        .ok()
        .map(|identity| state.pages.visible_to(&identity));
    Html(views::home_page(nav.as_deref()))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "chatgate"
    }))
}

/// Bind and serve until the process is stopped
///
/// # Errors
///
/// Returns error if the address is invalid or the listener cannot bind
pub async fn start_server(config: &Config) -> Result<()> {
    let state = AppState::from_config(config)?;
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| ChatgateError::Config(format!("Invalid address: {}", e)))?;

    tracing::info!("Starting chatgate on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(ChatgateError::Io)?;
    axum::serve(listener, app).await.map_err(ChatgateError::Io)?;

    Ok(())
}
