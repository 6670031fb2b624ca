// src/relay/routes.rs
// HTTP route handlers for the relay

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, HeaderName, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::relay::RelayServer;
use crate::relay::prompt::SYSTEM_PROMPT;
use crate::types::{Message, Role};

/// Headers browsers may send on the chat request
const ALLOWED_HEADERS: [HeaderName; 4] = [
    header::AUTHORIZATION,
    HeaderName::from_static("x-client-info"),
    HeaderName::from_static("apikey"),
    header::CONTENT_TYPE,
];

/// Create the axum router with all relay routes
pub fn create_router(server: RelayServer) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(ALLOWED_HEADERS);

    Router::new()
        .route("/", post(relay_chat).options(preflight))
        .route("/mirror-chat", post(relay_chat).options(preflight))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Bare OPTIONS without preflight headers still gets an empty 200
async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Body accepted from the chat client
#[derive(Debug, Deserialize)]
pub struct RelayRequest {
    pub messages: Vec<Message>,
}

/// Body sent to the upstream gateway
#[derive(Debug, Serialize)]
pub struct UpstreamRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<UpstreamMessage<'a>>,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub struct UpstreamMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

/// Prepend the system instruction and ask for a streamed completion
pub fn build_upstream_request<'a>(model: &'a str, messages: &'a [Message]) -> UpstreamRequest<'a> {
    let system = UpstreamMessage {
        role: "system",
        content: SYSTEM_PROMPT,
    };
    let conversation = messages.iter().map(|m| UpstreamMessage {
        role: match m.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        },
        content: &m.content,
    });

    UpstreamRequest {
        model,
        messages: std::iter::once(system).chain(conversation).collect(),
        stream: true,
    }
}

/// Forward a conversation upstream and pipe the event stream back
async fn relay_chat(
    State(server): State<RelayServer>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, RelayError> {
    server.authorize(&headers)?;

    let request: RelayRequest =
        serde_json::from_slice(&body).map_err(|e| RelayError::BadRequest(e.to_string()))?;

    let api_key = server.config.upstream_api_key.as_deref().ok_or_else(|| {
        error!("Upstream API key is not configured");
        RelayError::MissingApiKey
    })?;

    info!(messages = request.messages.len(), "Calling AI gateway");

    let upstream_body = build_upstream_request(&server.config.model, &request.messages);

    let response = server
        .client
        .post(&server.config.upstream_url)
        .bearer_auth(api_key)
        .json(&upstream_body)
        .send()
        .await
        .map_err(|e| {
            error!("AI gateway request failed: {}", e);
            RelayError::Upstream(e.to_string())
        })?;

    let status = response.status();
    if !status.is_success() {
        let text = response
            .text()
            .await
            .unwrap_or_else(|e| format!("(failed to read body: {})", e));
        error!(status = %status, body = %text, "AI gateway error");
        return Err(RelayError::from_upstream_status(status.as_u16()));
    }

    let body = Body::from_stream(response.bytes_stream());

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(body)
        .map_err(|e| RelayError::Internal(e.to_string()))
}

/// Relay error types, each rendered as `{ "error": <message> }`
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("upstream API key is not configured")]
    MissingApiKey,

    #[error("{0}")]
    Upstream(String),

    #[error("Rate limit exceeded. Please slow down.")]
    RateLimited,

    #[error("AI usage limit reached. Please add credits to continue.")]
    UsageLimit,

    #[error("AI gateway error")]
    Gateway,

    #[error("{0}")]
    Internal(String),
}

impl RelayError {
    /// Map a non-success upstream status to what the caller sees
    pub fn from_upstream_status(status: u16) -> Self {
        match status {
            429 => RelayError::RateLimited,
            402 => RelayError::UsageLimit,
            _ => RelayError::Gateway,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Unauthorized => StatusCode::UNAUTHORIZED,
            RelayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            RelayError::UsageLimit => StatusCode::PAYMENT_REQUIRED,
            RelayError::BadRequest(_)
            | RelayError::MissingApiKey
            | RelayError::Upstream(_)
            | RelayError::Gateway
            | RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_mapping() {
        assert!(matches!(RelayError::from_upstream_status(429), RelayError::RateLimited));
        assert!(matches!(RelayError::from_upstream_status(402), RelayError::UsageLimit));
        assert!(matches!(RelayError::from_upstream_status(401), RelayError::Gateway));
        assert!(matches!(RelayError::from_upstream_status(503), RelayError::Gateway));
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(RelayError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(RelayError::UsageLimit.status(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(RelayError::Gateway.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            RelayError::MissingApiKey.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(RelayError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_upstream_request_prepends_system() {
        let messages = vec![Message::user("hello"), Message::assistant("hi")];
        let request = build_upstream_request("test/model", &messages);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "test/model");
        assert_eq!(json["stream"], true);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][2]["content"], "hi");
    }

    #[test]
    fn test_upstream_request_empty_conversation() {
        let request = build_upstream_request("m", &[]);
        assert_eq!(request.messages.len(), 1);
    }
}
