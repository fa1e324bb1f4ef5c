//! Error types for fan-control operations

use thiserror::Error;

/// Error type for BMC, holiday and configuration operations
#[derive(Debug, Error)]
pub enum FanError {
    /// Transport failure (connect, TLS, timeout)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response did not have the expected shape
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Login handshake did not yield a usable session
    #[error("authentication failed: {0}")]
    Auth(String),

    /// BMC answered with a non-success HTTP status
    #[error("request failed ({status}): {body}")]
    Request {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Settings or host list could not be loaded
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Operator input was rejected
    #[error("validation error: {0}")]
    Validation(String),
}

impl From<config::ConfigError> for FanError {
    fn from(err: config::ConfigError) -> Self {
        FanError::Config(err.to_string())
    }
}

/// Result type for fan-control operations
pub type Result<T> = std::result::Result<T, FanError>;
