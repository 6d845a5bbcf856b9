//! Error types for the ctxlog_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ctxlog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required configuration missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Hostname could not be read from the host environment
    #[error("Hostname resolution error: {0}")]
    HostResolution(#[source] io::Error),

    /// The logging engine could not be initialized
    #[error("Engine initialization error: {0}")]
    EngineInit(#[source] io::Error),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
