// src/error.rs
// Standardized error types for Mirror

use thiserror::Error;

/// Main error type for the Mirror library
#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    #[error("prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

/// Convenience type alias for Result using MirrorError
pub type Result<T> = std::result::Result<T, MirrorError>;
