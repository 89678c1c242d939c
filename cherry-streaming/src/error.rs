//! Streaming errors.

use cherry_core::CoreError;
use thiserror::Error;

/// Errors that can occur while processing a model output stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The upstream model stream failed.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The consumer stopped pulling before the upstream finished.
    #[error("Stream cancelled before completion")]
    Cancelled,

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] CoreError),

    /// JSON parse error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl StreamError {
    /// Check if the stream ended because the consumer went away.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if retrying the request may succeed.
    ///
    /// Configuration and decoding errors will fail the same way again.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Upstream(_) | Self::Cancelled)
    }

    /// Wrap an upstream failure.
    pub fn upstream<E: std::fmt::Display>(err: E) -> Self {
        Self::Upstream(err.to_string())
    }

    /// Create from any error.
    pub fn from_err<E: std::fmt::Display>(err: E) -> Self {
        Self::Other(err.to_string())
    }
}

/// Result type for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;
