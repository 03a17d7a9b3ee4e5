//! Error types for the statistics client.

use thiserror::Error;

/// Errors that can occur while fetching cluster statistics.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed (connection refused, DNS, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Cluster returned a non-success response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Request exceeded the configured timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Invalid connection configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Signed transport could not resolve credentials.
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// Response body was not valid JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
