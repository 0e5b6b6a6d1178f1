//! Error types for ironmq-migrate.

use thiserror::Error;

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while talking to either queue service or loading settings.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or incomplete configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Credentials were rejected by the remote service.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The requested queue or message does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The remote service answered with a non-success status.
    #[error("{service} error {status}: {body}")]
    Api {
        /// Which service answered (`v2` or `v3`).
        service: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
