// src/lib.rs

pub mod client;
pub mod config;
pub mod error;
pub mod gate;
pub mod http;
pub mod relay;
pub mod repl;
pub mod stream;
pub mod types;
