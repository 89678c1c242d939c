//! Error types for cherry-core.
//!
//! Configuration problems are caught when a value is built, so the streaming
//! machinery downstream never has to deal with a degenerate tag pair.

use thiserror::Error;

/// The main error type for cherry-core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The opening/closing tag pair cannot be used for extraction.
    #[error("Invalid tag pair: {reason}")]
    InvalidTagPair {
        /// What is wrong with the pair.
        reason: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Create an invalid tag pair error.
    pub fn invalid_tag_pair(reason: impl Into<String>) -> Self {
        Self::InvalidTagPair {
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Check if this is a configuration-time error.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidTagPair { .. } | Self::Configuration(_))
    }
}

/// Result type alias using CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_tag_pair_display() {
        let err = CoreError::invalid_tag_pair("opening tag is empty");
        assert_eq!(err.to_string(), "Invalid tag pair: opening tag is empty");
        assert!(err.is_configuration());
    }

    #[test]
    fn test_serialization_from() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Serialization(_)));
        assert!(!err.is_configuration());
    }
}
