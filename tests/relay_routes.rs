// tests/relay_routes.rs
// Relay router against a stub AI gateway

mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use common::*;
use mirror::relay::{RelayServer, SYSTEM_PROMPT, create_router};

fn router(config: mirror::config::RelayConfig) -> Router {
    create_router(RelayServer::new(config))
}

fn chat_request(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/mirror-chat")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::from(body))
        .unwrap()
}

fn hello() -> String {
    json!({ "messages": [{ "role": "user", "content": "hello" }] }).to_string()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn error_message(response: axum::response::Response) -> String {
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    body["error"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn streams_upstream_body_verbatim() {
    let gateway = spawn_gateway(StatusCode::OK, HI_THERE_STREAM).await;

    let response = router(relay_config(&gateway.url))
        .oneshot(chat_request(hello()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
    assert_eq!(body_text(response).await, HI_THERE_STREAM);
}

#[tokio::test]
async fn prepends_system_prompt_and_requests_streaming() {
    let gateway = spawn_gateway(StatusCode::OK, HI_THERE_STREAM).await;
    let body = json!({
        "messages": [
            { "role": "user", "content": "who are you" },
            { "role": "assistant", "content": "you" },
            { "role": "user", "content": "hello" }
        ]
    })
    .to_string();

    let response = router(relay_config(&gateway.url))
        .oneshot(chat_request(body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let requests = gateway.requests();
    assert_eq!(requests.len(), 1);
    let sent = &requests[0];
    assert_eq!(
        sent.authorization.as_deref(),
        Some(format!("Bearer {}", TEST_API_KEY).as_str())
    );
    assert_eq!(sent.body["model"], TEST_MODEL);
    assert_eq!(sent.body["stream"], true);

    let messages = sent.body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[0]["content"], SYSTEM_PROMPT);
    assert_eq!(messages[1]["role"], "user");
    assert_eq!(messages[2]["role"], "assistant");
    assert_eq!(messages[3]["content"], "hello");
}

#[tokio::test]
async fn maps_rate_limit() {
    let gateway = spawn_gateway(StatusCode::TOO_MANY_REQUESTS, r#"{"message":"slow"}"#).await;

    let response = router(relay_config(&gateway.url))
        .oneshot(chat_request(hello()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
    assert_eq!(
        error_message(response).await,
        "Rate limit exceeded. Please slow down."
    );
}

#[tokio::test]
async fn maps_usage_limit() {
    let gateway = spawn_gateway(StatusCode::PAYMENT_REQUIRED, "{}").await;

    let response = router(relay_config(&gateway.url))
        .oneshot(chat_request(hello()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(
        error_message(response).await,
        "AI usage limit reached. Please add credits to continue."
    );
}

#[tokio::test]
async fn maps_other_upstream_failures_to_gateway_error() {
    let gateway = spawn_gateway(StatusCode::SERVICE_UNAVAILABLE, "down for maintenance").await;

    let response = router(relay_config(&gateway.url))
        .oneshot(chat_request(hello()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_message(response).await, "AI gateway error");
}

#[tokio::test]
async fn missing_api_key_is_a_request_error() {
    let gateway = spawn_gateway(StatusCode::OK, HI_THERE_STREAM).await;
    let mut config = relay_config(&gateway.url);
    config.upstream_api_key = None;

    let response = router(config).oneshot(chat_request(hello())).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        error_message(response).await,
        "upstream API key is not configured"
    );
    assert!(gateway.requests().is_empty());
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let gateway = spawn_gateway(StatusCode::OK, HI_THERE_STREAM).await;

    let response = router(relay_config(&gateway.url))
        .oneshot(chat_request("{not json".to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!error_message(response).await.is_empty());
    assert!(gateway.requests().is_empty());
}

#[tokio::test]
async fn unreachable_upstream_is_a_server_error() {
    let url = dead_url().await;

    let response = router(relay_config(&url))
        .oneshot(chat_request(hello()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!error_message(response).await.is_empty());
}

#[tokio::test]
async fn answers_cors_preflight() {
    let gateway = spawn_gateway(StatusCode::OK, HI_THERE_STREAM).await;
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/mirror-chat")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-client-info, apikey")
        .body(Body::empty())
        .unwrap();

    let response = router(relay_config(&gateway.url))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let allowed = headers[header::ACCESS_CONTROL_ALLOW_HEADERS]
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    for name in ["authorization", "x-client-info", "apikey", "content-type"] {
        assert!(allowed.contains(name), "missing {} in {}", name, allowed);
    }
    assert!(gateway.requests().is_empty());
}

#[tokio::test]
async fn bare_options_gets_empty_ok() {
    let gateway = spawn_gateway(StatusCode::OK, HI_THERE_STREAM).await;
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/mirror-chat")
        .body(Body::empty())
        .unwrap();

    let response = router(relay_config(&gateway.url))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.is_empty());
}

#[tokio::test]
async fn root_path_also_relays() {
    let gateway = spawn_gateway(StatusCode::OK, HI_THERE_STREAM).await;
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(hello()))
        .unwrap();

    let response = router(relay_config(&gateway.url))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, HI_THERE_STREAM);
}

#[tokio::test]
async fn client_key_is_enforced_when_configured() {
    let gateway = spawn_gateway(StatusCode::OK, HI_THERE_STREAM).await;
    let mut config = relay_config(&gateway.url);
    config.client_key = Some("letmein".to_string());
    let app = router(config);

    let response = app.clone().oneshot(chat_request(hello())).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(response).await, "Unauthorized");
    assert!(gateway.requests().is_empty());

    let mut request = chat_request(hello());
    request.headers_mut().insert(
        header::AUTHORIZATION,
        "Bearer letmein".parse().unwrap(),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The gateway sees the upstream key, never the client's
    let requests = gateway.requests();
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some(format!("Bearer {}", TEST_API_KEY).as_str())
    );
}

#[tokio::test]
async fn client_key_checked_before_body() {
    let gateway = spawn_gateway(StatusCode::OK, HI_THERE_STREAM).await;
    let mut config = relay_config(&gateway.url);
    config.client_key = Some("letmein".to_string());

    let response = router(config)
        .oneshot(chat_request("{not json".to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(response).await, "Unauthorized");
    assert!(gateway.requests().is_empty());
}

#[tokio::test]
async fn health_reports_ok() {
    let gateway = spawn_gateway(StatusCode::OK, HI_THERE_STREAM).await;
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = router(relay_config(&gateway.url))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "ok");
}
