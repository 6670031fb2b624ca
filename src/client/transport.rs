//! HTTP transport from the chat shell to the relay

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use std::pin::Pin;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::http::create_shared_client;
use crate::types::{ChatRequest, Message};

/// Shown when the relay reports a rate limit
pub const RATE_LIMIT_NOTICE: &str = "Please slow down. The mirror needs time to reflect.";

/// Shown when the relay reports exhausted credits
pub const USAGE_LIMIT_NOTICE: &str = "AI usage limit reached. Please add credits to continue.";

/// Shown for every other failed round trip
pub const CONNECTION_NOTICE: &str = "Connection failed. Try again.";

/// Fallback when a rejected response carries no error message
const FAILED_TO_CONNECT: &str = "Failed to connect";

/// Raw reply body as it arrives
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ChatError>> + Send>>;

/// Why a round trip failed
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("rate limited by the AI gateway")]
    RateLimited,

    #[error("AI usage limit reached")]
    UsageLimit,

    #[error("relay rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),
}

impl ChatError {
    /// Classify a non-success relay response
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            429 => ChatError::RateLimited,
            402 => ChatError::UsageLimit,
            _ => ChatError::Rejected {
                status,
                message: message.unwrap_or_else(|| FAILED_TO_CONNECT.to_string()),
            },
        }
    }

    /// User-facing notification for this failure
    pub fn notice(&self) -> &'static str {
        match self {
            ChatError::RateLimited => RATE_LIMIT_NOTICE,
            ChatError::UsageLimit => USAGE_LIMIT_NOTICE,
            ChatError::Rejected { .. } | ChatError::Transport(_) => CONNECTION_NOTICE,
        }
    }

    /// Whether the optimistic user entry should be taken back.
    ///
    /// Limit responses abandon the round trip but leave the user's words on
    /// screen; every other failure undoes it.
    pub fn rolls_back(&self) -> bool {
        matches!(self, ChatError::Rejected { .. } | ChatError::Transport(_))
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::Transport(err.to_string())
    }
}

/// Opens a streamed reply for a conversation
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn open(&self, messages: &[Message]) -> Result<ByteStream, ChatError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Talks to the relay over HTTP
#[derive(Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    url: String,
    client_key: Option<String>,
}

impl RelayClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            http: create_shared_client(),
            url: config.relay_url.clone(),
            client_key: config.client_key.clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChatTransport for RelayClient {
    async fn open(&self, messages: &[Message]) -> Result<ByteStream, ChatError> {
        let mut request = self.http.post(&self.url).json(&ChatRequest { messages });
        if let Some(key) = &self.client_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error);
            tracing::debug!(status = %status, message = ?message, "Relay rejected chat request");
            return Err(ChatError::from_status(status.as_u16(), message));
        }

        Ok(Box::pin(response.bytes_stream().map(|chunk| chunk.map_err(ChatError::from))))
    }
}
