use serde_json::json;

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chatgate::broker::{BrokerError, SessionBroker};

mod common;

async fn mount_session(server: &MockServer, workflow_id: &str, secret: &str) {
    Mock::given(method("POST"))
        .and(path("/chatkit/sessions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(header("openai-beta", "chatkit_beta=v1"))
        .and(body_partial_json(json!({ "workflow": { "id": workflow_id } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "client_secret": secret,
            "expires_after": 600
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_current_secret_short_circuits_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let broker = SessionBroker::from_config(&common::chatkit_config(&server.uri())).unwrap();
    let secret = broker
        .client_secret(Some("bananhot"), Some("cs_held"))
        .await
        .unwrap();
    assert_eq!(secret, "cs_held");
}

#[tokio::test]
async fn test_default_workflow_minted_when_no_selector() {
    let server = MockServer::start().await;
    mount_session(&server, "wf_default", "cs_default").await;

    let broker = SessionBroker::from_config(&common::chatkit_config(&server.uri())).unwrap();
    let secret = broker.client_secret(None, None).await.unwrap();
    assert_eq!(secret, "cs_default");
}

#[tokio::test]
async fn test_empty_current_secret_is_not_reused() {
    let server = MockServer::start().await;
    mount_session(&server, "wf_default", "cs_fresh").await;

    let broker = SessionBroker::from_config(&common::chatkit_config(&server.uri())).unwrap();
    let secret = broker.client_secret(None, Some("")).await.unwrap();
    assert_eq!(secret, "cs_fresh");
}

#[tokio::test]
async fn test_bananhot_selector_uses_its_workflow() {
    let server = MockServer::start().await;
    mount_session(&server, "wf_bananhot", "cs_banana").await;

    let broker = SessionBroker::from_config(&common::chatkit_config(&server.uri())).unwrap();
    let credential = broker.mint(Some("bananhot")).await.unwrap();
    assert_eq!(credential.client_secret, "cs_banana");
    assert_eq!(credential.workflow_id, "wf_bananhot");
}

#[tokio::test]
async fn test_selector_match_is_exact() {
    let server = MockServer::start().await;
    mount_session(&server, "wf_default", "cs_default").await;

    let broker = SessionBroker::from_config(&common::chatkit_config(&server.uri())).unwrap();
    let credential = broker.mint(Some("BANANHOT")).await.unwrap();
    assert_eq!(credential.workflow_id, "wf_default");
}

#[tokio::test]
async fn test_session_user_is_anonymous_with_timestamp() {
    let server = MockServer::start().await;
    mount_session(&server, "wf_default", "cs_default").await;

    let broker = SessionBroker::from_config(&common::chatkit_config(&server.uri())).unwrap();
    broker.mint(None).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let user = body["user"].as_str().unwrap();
    let millis = user.strip_prefix("anonymous-user-").unwrap();
    assert!(millis.parse::<i64>().unwrap() > 0);
}

#[tokio::test]
async fn test_missing_configuration_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut no_key = common::chatkit_config(&server.uri());
    no_key.api_key = None;
    let err = SessionBroker::from_config(&no_key)
        .unwrap()
        .mint(Some("bananhot"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        BrokerError::Configuration("OPENAI_API_KEY not configured".to_string())
    );

    let mut no_bananhot = common::chatkit_config(&server.uri());
    no_bananhot.workflows.remove("WORKFLOW_ID_BANANHOT");
    let err = SessionBroker::from_config(&no_bananhot)
        .unwrap()
        .mint(Some("bananhot"))
        .await
        .unwrap_err();
    assert!(matches!(err, BrokerError::Configuration(ref m) if m.starts_with("WORKFLOW_ID_BANANHOT not configured")));
}

#[tokio::test]
async fn test_upstream_rejection_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chatkit/sessions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .expect(1)
        .mount(&server)
        .await;

    let broker = SessionBroker::from_config(&common::chatkit_config(&server.uri())).unwrap();
    let err = broker.mint(None).await.unwrap_err();
    assert_eq!(
        err,
        BrokerError::Upstream {
            status: 429,
            body: "rate limited".to_string()
        }
    );
    assert_eq!(err.status_code().as_u16(), 429);
}

#[tokio::test]
async fn test_success_without_secret_is_internal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chatkit/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "sess_1" })))
        .mount(&server)
        .await;

    let broker = SessionBroker::from_config(&common::chatkit_config(&server.uri())).unwrap();
    let err = broker.mint(None).await.unwrap_err();
    assert!(matches!(err, BrokerError::Internal(_)));
}
