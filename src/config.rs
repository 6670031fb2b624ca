//! Configuration file support for mirror
//!
//! Loads config from ~/.mirror/config.toml. CLI flags and environment
//! variables (resolved by clap) take precedence over the file.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::gate::DEFAULT_PASSWORD;

/// Default upstream chat-completion endpoint
pub const DEFAULT_UPSTREAM_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";

/// Default model requested from the gateway
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8787;

/// Where the chat shell finds the relay when nothing else is set
pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:8787/mirror-chat";

/// Contents of ~/.mirror/config.toml
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Upstream chat-completion endpoint
    pub upstream_url: Option<String>,

    /// Upstream bearer credential
    pub upstream_api_key: Option<String>,

    /// Model name sent upstream
    pub model: Option<String>,

    /// Bind host for `mirror serve`
    pub host: Option<String>,

    /// Bind port for `mirror serve`
    pub port: Option<u16>,

    /// Bearer key callers must present to the relay (and the shell sends)
    pub client_key: Option<String>,

    /// Relay endpoint used by `mirror chat`
    pub relay_url: Option<String>,

    /// Gate password for `mirror chat`
    pub password: Option<String>,
}

impl Config {
    /// Load config from ~/.mirror/config.toml, falling back to defaults
    pub fn load() -> Self {
        let path = config_path();

        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

/// Get the config directory (~/.mirror)
pub fn config_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(".mirror")
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load `.env` from ~/.mirror/.env, or the current directory
pub fn load_dotenv() {
    let env_path = Some(config_dir().join(".env")).filter(|p| p.exists());
    if let Some(path) = env_path {
        let _ = dotenvy::from_path(&path);
    } else {
        let _ = dotenvy::dotenv();
    }
}

/// Resolved settings for the relay
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub upstream_url: String,
    /// Checked per request; a missing key is a request-time error
    pub upstream_api_key: Option<String>,
    pub model: String,
    pub client_key: Option<String>,
}

impl RelayConfig {
    /// Merge already-resolved CLI/env values over the file config
    pub fn resolve(
        file: &Config,
        host: Option<String>,
        port: Option<u16>,
        upstream_url: Option<String>,
        upstream_api_key: Option<String>,
        model: Option<String>,
        client_key: Option<String>,
    ) -> Self {
        Self {
            host: host
                .or_else(|| file.host.clone())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: port.or(file.port).unwrap_or(DEFAULT_PORT),
            upstream_url: upstream_url
                .or_else(|| file.upstream_url.clone())
                .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string()),
            upstream_api_key: non_empty(upstream_api_key.or_else(|| file.upstream_api_key.clone())),
            model: model
                .or_else(|| file.model.clone())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client_key: non_empty(client_key.or_else(|| file.client_key.clone())),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Resolved settings for the chat shell
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub relay_url: String,
    pub client_key: Option<String>,
    pub password: String,
}

impl ClientConfig {
    pub fn resolve(
        file: &Config,
        relay_url: Option<String>,
        client_key: Option<String>,
        password: Option<String>,
    ) -> Self {
        Self {
            relay_url: relay_url
                .or_else(|| file.relay_url.clone())
                .unwrap_or_else(|| DEFAULT_RELAY_URL.to_string()),
            client_key: non_empty(client_key.or_else(|| file.client_key.clone())),
            password: password
                .or_else(|| file.password.clone())
                .unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
