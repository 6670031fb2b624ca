// tests/common/mod.rs
// Stub AI gateway and relay fixtures shared by the integration tests

#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::Response,
    routing::post,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use mirror::config::RelayConfig;
use mirror::relay::RelayServer;

pub const TEST_API_KEY: &str = "test-key";
pub const TEST_MODEL: &str = "test/model";

/// Two fragments then the sentinel
pub const HI_THERE_STREAM: &str = concat!(
    "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n",
    ": keep-alive\n\n",
    "data: {\"choices\":[{\"delta\":{\"content\":\" there\"}}]}\n\n",
    "data: [DONE]\n\n",
);

/// A request as the stub gateway saw it
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct Stub {
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
    status: StatusCode,
    body: &'static str,
}

pub struct StubGateway {
    pub url: String,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl StubGateway {
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock().unwrap().clone()
    }
}

/// Serve a gateway that answers every chat request with `status` and `body`
pub async fn spawn_gateway(status: StatusCode, body: &'static str) -> StubGateway {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let stub = Stub {
        captured: captured.clone(),
        status,
        body,
    };
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(stub);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubGateway {
        url: format!("http://{}/v1/chat/completions", addr),
        captured,
    }
}

async fn completions(State(stub): State<Stub>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    stub.captured
        .lock()
        .unwrap()
        .push(CapturedRequest { authorization, body });

    let content_type = if stub.status.is_success() {
        "text/event-stream"
    } else {
        "application/json"
    };
    Response::builder()
        .status(stub.status)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(stub.body))
        .unwrap()
}

pub fn relay_config(upstream_url: &str) -> RelayConfig {
    RelayConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        upstream_url: upstream_url.to_string(),
        upstream_api_key: Some(TEST_API_KEY.to_string()),
        model: TEST_MODEL.to_string(),
        client_key: None,
    }
}

/// Run a relay on a random port and return its chat URL
pub async fn spawn_relay(config: RelayConfig) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        RelayServer::new(config).serve(listener).await.unwrap();
    });
    format!("http://{}/mirror-chat", addr)
}

/// A URL nothing is listening on
pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/v1/chat/completions", addr)
}
