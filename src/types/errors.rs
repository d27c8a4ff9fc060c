//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context.

use thiserror::Error;

use crate::client::ApiError;
use crate::tools::Envelope;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the Sequence MCP server.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed tool argument (detected before any request).
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing credential or invalid setting (detected before any request).
    #[error("configuration error: {0}")]
    Config(String),

    /// Normalized Sequence API failure.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Internal errors.
    #[error("internal error: {0}")]
    Internal(String),

    /// A tool result could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Convert to the error envelope returned to tool callers.
    ///
    /// Only API errors carry a code and status; everything else is rendered
    /// with a message alone.
    pub fn to_envelope(&self) -> Envelope {
        match self {
            Error::Validation(msg) | Error::Config(msg) | Error::Internal(msg) => {
                Envelope::error(msg.clone())
            }
            Error::Api(err) => Envelope::from(err),
            Error::Serialization(_) => Envelope::error("failed to serialize tool result"),
        }
    }
}

// Convenience constructors
impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<Error> for Envelope {
    fn from(err: Error) -> Self {
        err.to_envelope()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ErrorEnvelope;

    fn error_of(envelope: Envelope) -> ErrorEnvelope {
        match envelope {
            Envelope::Error(err) => err,
            other => panic!("expected error envelope, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_renders_message_only() {
        let err = error_of(Error::validation("rule_id is required").to_envelope());
        assert_eq!(err.message, "rule_id is required");
        assert_eq!(err.code, None);
        assert_eq!(err.status_code, None);
    }

    #[test]
    fn test_api_error_keeps_code_and_status() {
        let api = ApiError::new("INVALID_API_SECRET", "Unauthorized", Some(401));
        let err = error_of(Error::from(api).to_envelope());
        assert_eq!(err.code.as_deref(), Some("INVALID_API_SECRET"));
        assert_eq!(err.message, "Unauthorized");
        assert_eq!(err.status_code, Some(401));
    }

    #[test]
    fn test_serialization_error_does_not_leak_details() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = error_of(Error::from(serde_err).to_envelope());
        assert_eq!(err.message, "failed to serialize tool result");
        assert_eq!(err.code, None);
    }

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            Error::config("credential not configured").to_string(),
            "configuration error: credential not configured"
        );
    }
}
