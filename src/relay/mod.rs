// src/relay/mod.rs
// Stateless relay in front of the AI gateway

pub mod prompt;
mod routes;
mod server;

pub use prompt::SYSTEM_PROMPT;
pub use routes::{RelayError, RelayRequest, build_upstream_request, create_router};
pub use server::RelayServer;
