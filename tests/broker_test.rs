//! Token broker against a CapSolver double.

use seo_mcp::captcha::{AccessToken, CapSolverBroker, TokenBroker};
use seo_mcp::core::config::{SeoConfig, AHREFS_TURNSTILE_SITE_KEY};
use seo_mcp::TokenError;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{any, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TARGET: &str = "https://ahrefs.com/keyword-difficulty/?country=us&input=rust";

fn config_for(server: &MockServer) -> SeoConfig {
    SeoConfig {
        capsolver_api_key: Some("test-key".to_string()),
        capsolver_base_url: server.uri(),
        poll_interval: Duration::from_millis(10),
        max_polls: 5,
        solve_timeout: Duration::from_secs(10),
        cache_dir: None,
        ..SeoConfig::default()
    }
}

fn broker(config: &SeoConfig) -> CapSolverBroker {
    CapSolverBroker::new(reqwest::Client::new(), config)
}

async fn mount_create_task(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/createTask"))
        .and(body_partial_json(json!({
            "clientKey": "test-key",
            "task": {
                "type": "AntiTurnstileTaskProxyLess",
                "websiteKey": AHREFS_TURNSTILE_SITE_KEY,
                "websiteURL": TARGET
            }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"errorId": 0, "taskId": "task-1"})),
        )
        .expect(1)
        .mount(server)
        .await;
}

fn poll_status(status: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"errorId": 0, "status": status}))
}

#[tokio::test]
async fn failed_on_first_poll_yields_no_token() {
    let server = MockServer::start().await;
    mount_create_task(&server).await;
    Mock::given(method("POST"))
        .and(path("/getTaskResult"))
        .and(body_partial_json(json!({"clientKey": "test-key", "taskId": "task-1"})))
        .respond_with(poll_status("failed"))
        .expect(1)
        .mount(&server)
        .await;

    let err = broker(&config_for(&server)).acquire(TARGET).await.unwrap_err();
    assert!(matches!(err, TokenError::SolverFailed(_)), "got {:?}", err);
}

#[tokio::test]
async fn pending_then_ready_returns_exact_token_after_two_polls() {
    let server = MockServer::start().await;
    mount_create_task(&server).await;
    Mock::given(method("POST"))
        .and(path("/getTaskResult"))
        .respond_with(poll_status("processing"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/getTaskResult"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errorId": 0,
            "status": "ready",
            "solution": {"token": "0.turnstile-token"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token = broker(&config_for(&server)).acquire(TARGET).await.unwrap();
    assert_eq!(token, AccessToken::new("0.turnstile-token"));
}

#[tokio::test]
async fn poll_ceiling_surfaces_timeout() {
    let server = MockServer::start().await;
    mount_create_task(&server).await;
    Mock::given(method("POST"))
        .and(path("/getTaskResult"))
        .respond_with(poll_status("processing"))
        .expect(3)
        .mount(&server)
        .await;

    let config = SeoConfig {
        max_polls: 3,
        ..config_for(&server)
    };
    match broker(&config).acquire(TARGET).await {
        Err(TokenError::Timeout { polls, .. }) => assert_eq!(polls, 3),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn deadline_stops_polling_before_the_ceiling() {
    let server = MockServer::start().await;
    mount_create_task(&server).await;
    Mock::given(method("POST"))
        .and(path("/getTaskResult"))
        .respond_with(poll_status("processing"))
        .mount(&server)
        .await;

    let config = SeoConfig {
        poll_interval: Duration::from_millis(20),
        max_polls: 1_000,
        solve_timeout: Duration::from_millis(150),
        ..config_for(&server)
    };
    match broker(&config).acquire(TARGET).await {
        Err(TokenError::Timeout { polls, waited }) => {
            assert!(polls < 1_000);
            assert!(waited < Duration::from_secs(5));
        }
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_task_id_is_a_submission_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/createTask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"errorId": 0})))
        .mount(&server)
        .await;
    Mock::given(path("/getTaskResult"))
        .respond_with(poll_status("ready"))
        .expect(0)
        .mount(&server)
        .await;

    let err = broker(&config_for(&server)).acquire(TARGET).await.unwrap_err();
    assert!(matches!(err, TokenError::Submission(_)), "got {:?}", err);
}

#[tokio::test]
async fn rejected_key_reports_solver_error_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/createTask"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errorId": 1,
            "errorCode": "ERROR_KEY_DENIED_ACCESS",
            "errorDescription": "Key denied"
        })))
        .mount(&server)
        .await;

    let err = broker(&config_for(&server)).acquire(TARGET).await.unwrap_err();
    match err {
        TokenError::Submission(msg) => assert!(msg.contains("ERROR_KEY_DENIED_ACCESS")),
        other => panic!("expected submission error, got {:?}", other),
    }
}

#[tokio::test]
async fn garbage_body_is_not_a_panic() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/createTask"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let err = broker(&config_for(&server)).acquire(TARGET).await.unwrap_err();
    assert!(matches!(err, TokenError::Submission(_)), "got {:?}", err);
}

#[tokio::test]
async fn missing_api_key_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = SeoConfig {
        capsolver_api_key: None,
        ..config_for(&server)
    };
    let err = broker(&config).acquire(TARGET).await.unwrap_err();
    assert!(matches!(err, TokenError::MissingApiKey));
}
