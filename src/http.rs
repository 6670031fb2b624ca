// src/http.rs
// Shared HTTP client for relay and chat calls

use std::time::Duration;

/// Connect timeout for upstream and relay calls
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Idle read timeout between stream chunks
pub const READ_TIMEOUT: Duration = Duration::from_secs(300);

/// Create the shared HTTP client.
///
/// No total request timeout is set: a streamed reply stays open for as long
/// as the gateway keeps producing tokens. Stalls are caught by the read
/// timeout instead.
pub fn create_shared_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .read_timeout(READ_TIMEOUT)
        .pool_max_idle_per_host(10)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
