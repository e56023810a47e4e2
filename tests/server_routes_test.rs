use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use serde_json::{json, Value};
use tower::ServiceExt;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chatgate::broker::SessionBroker;
use chatgate::config::Config;
use chatgate::pages::PageRegistry;
use chatgate::server::{router, AppState};

mod common;

const ME: &str = "/api/auth/me";

/// State wired to one mock server playing both the session API and the
/// identity service
fn app_state(server: &MockServer) -> AppState {
    AppState {
        broker: Arc::new(
            SessionBroker::from_config(&common::chatkit_config(&server.uri())).unwrap(),
        ),
        resolver: common::identity_resolver(&format!("{}{}", server.uri(), ME)),
        pages: Arc::new(PageRegistry::new(Config::default().pages)),
        home_path: "/".to_string(),
    }
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_session(body: &'static str) -> Request<Body> {
    Request::post("/api/chatkit/session")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn mount_identity(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path(ME))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_session_endpoint_mints_for_selector() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chatkit/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "client_secret": "cs_b" })))
        .expect(1)
        .mount(&server)
        .await;

    let response = router(app_state(&server))
        .oneshot(post_session(r#"{"workflowId":"bananhot"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "client_secret": "cs_b" }));
}

#[tokio::test]
async fn test_session_endpoint_relays_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chatkit/sessions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let response = router(app_state(&server))
        .oneshot(post_session("{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Failed to create ChatKit session", "details": "invalid api key" })
    );
}

#[tokio::test]
async fn test_session_endpoint_reports_missing_workflow() {
    let server = MockServer::start().await;
    let mut state = app_state(&server);
    let mut chatkit = common::chatkit_config(&server.uri());
    chatkit.workflows.clear();
    state.broker = Arc::new(SessionBroker::from_config(&chatkit).unwrap());

    let response = router(state).oneshot(post_session("{}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("WORKFLOW_ID not configured"));
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_session_endpoint_rejects_non_object_body() {
    let server = MockServer::start().await;
    let response = router(app_state(&server))
        .oneshot(post_session("null"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await, json!({ "error": "Internal server error" }));
}

#[tokio::test]
async fn test_gated_page_redirects_without_access() {
    let server = MockServer::start().await;
    mount_identity(&server, json!({ "id": 3, "pageAccess": { "csm": false } })).await;

    let response = router(app_state(&server))
        .oneshot(Request::get("/csm-dashboard").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn test_chat_page_served_with_access() {
    let server = MockServer::start().await;
    mount_identity(
        &server,
        json!({ "id": 3, "pageAccess": { "bananhot-chat": true } }),
    )
    .await;

    let response = router(app_state(&server))
        .oneshot(Request::get("/bananhot-chat").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8_lossy(&bytes);
    assert!(html.contains("openai-chatkit"));
    assert!(html.contains("data-workflow-id=\"bananhot\""));
}

#[tokio::test]
async fn test_home_is_never_gated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ME))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let response = router(app_state(&server))
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_visible_pages_hide_admin_from_non_superadmin() {
    let server = MockServer::start().await;
    mount_identity(
        &server,
        json!({ "id": 3, "pageAccess": { "csm": true, "admin": true }, "isSuperadmin": false }),
    )
    .await;

    let response = router(app_state(&server))
        .oneshot(Request::get("/api/pages/visible").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!([{ "slug": "csm", "label": "CSM Dashboard", "path": "/csm-dashboard" }])
    );
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start().await;
    let response = router(app_state(&server))
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(
        json_body(response).await,
        json!({ "status": "healthy", "service": "chatgate" })
    );
}
