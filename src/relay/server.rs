// src/relay/server.rs
// Axum HTTP server for the relay

use axum::http::{HeaderMap, header};
use std::sync::Arc;

use crate::config::RelayConfig;
use crate::http::create_shared_client;
use crate::relay::routes::{self, RelayError};

/// Shared state for the relay server. Immutable; cloned per request.
#[derive(Clone)]
pub struct RelayServer {
    /// Relay configuration
    pub config: Arc<RelayConfig>,
    /// Pooled upstream client
    pub client: reqwest::Client,
}

impl RelayServer {
    pub fn new(config: RelayConfig) -> Self {
        Self::with_client(config, create_shared_client())
    }

    pub fn with_client(config: RelayConfig, client: reqwest::Client) -> Self {
        Self {
            config: Arc::new(config),
            client,
        }
    }

    /// Check the caller's bearer credential when a client key is configured
    pub fn authorize(&self, headers: &HeaderMap) -> Result<(), RelayError> {
        let Some(expected) = self.config.client_key.as_deref() else {
            return Ok(());
        };

        let presented = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        if presented == Some(expected) {
            Ok(())
        } else {
            Err(RelayError::Unauthorized)
        }
    }

    /// Serve on an already bound listener
    pub async fn serve(self, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
        let app = routes::create_router(self);
        axum::serve(listener, app).await?;
        Ok(())
    }

    /// Start the relay server
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        tracing::info!("Mirror relay listening on {}", addr);
        tracing::info!(upstream = %self.config.upstream_url, model = %self.config.model, "Relay upstream");
        if self.config.upstream_api_key.is_none() {
            tracing::warn!("No upstream API key configured; chat requests will fail with 500");
        }

        self.serve(listener).await
    }
}
