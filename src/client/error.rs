//! Normalized failure type for every Sequence API call.
//!
//! Upstream failures arrive in many shapes: a well-formed `{code, message}`
//! body, an HTML error page from a proxy, an empty body, or no response at all.
//! All of them collapse into [`ApiError`] so callers handle exactly one type.

use serde::Deserialize;
use thiserror::Error;

/// Fallback code when an error body cannot be parsed.
pub const HTTP_ERROR: &str = "HTTP_ERROR";

/// Code for requests that never produced an HTTP response.
pub const TRANSPORT_ERROR: &str = "TRANSPORT_ERROR";

/// Code for calls rejected locally because no credential was configured.
pub const NO_CREDENTIAL_CONFIGURED: &str = "NO_CREDENTIAL_CONFIGURED";

/// Code for credentials that cannot be carried in an HTTP header.
pub const INVALID_CREDENTIAL: &str = "INVALID_CREDENTIAL";

/// Code for requests that could not be built locally (bad base URL, bad header).
pub const INVALID_REQUEST: &str = "INVALID_REQUEST";

/// Structured error raised by [`SequenceClient`](super::SequenceClient).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ApiError {
    /// Machine-readable code, verbatim from upstream when available.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// HTTP status; `None` for failures that never reached the server.
    pub status_code: Option<u16>,
}

/// Shape of a well-formed upstream error body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl ErrorBody {
    /// Best-effort parse; `None` for non-JSON bodies or missing fields.
    fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status_code,
        }
    }

    /// Normalize a non-success response.
    ///
    /// A `{code, message}` body is taken verbatim. Anything else becomes
    /// [`HTTP_ERROR`] with the status and raw body text in the message.
    pub fn from_response(status: u16, body: &str) -> Self {
        match ErrorBody::parse(body) {
            Some(parsed) => Self::new(parsed.code, parsed.message, Some(status)),
            None => Self::new(HTTP_ERROR, format!("HTTP {}: {}", status, body), Some(status)),
        }
    }

    /// A success response whose body did not match the expected shape.
    pub fn malformed(status: u16, err: &serde_json::Error) -> Self {
        Self::new(
            HTTP_ERROR,
            format!("HTTP {}: unexpected response body: {}", status, err),
            Some(status),
        )
    }

    /// The request failed before a response arrived (connect, TLS, timeout).
    pub fn transport(err: reqwest::Error) -> Self {
        // Strip the URL so query strings never reach logs or envelopes.
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            "failed to connect to the Sequence API".to_string()
        } else {
            err.without_url().to_string()
        };
        Self::new(TRANSPORT_ERROR, message, None)
    }

    pub fn no_credential(message: impl Into<String>) -> Self {
        Self::new(NO_CREDENTIAL_CONFIGURED, message, None)
    }

    pub fn invalid_credential(message: impl Into<String>) -> Self {
        Self::new(INVALID_CREDENTIAL, message, None)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(INVALID_REQUEST, message, None)
    }

    /// True when the failure was detected locally, without a response.
    pub fn is_local(&self) -> bool {
        self.status_code.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_structured_body_is_taken_verbatim() {
        let err = ApiError::from_response(
            401,
            r#"{"code":"INVALID_ACCESS_TOKEN","message":"Unauthorized"}"#,
        );
        assert_eq!(err.code, "INVALID_ACCESS_TOKEN");
        assert_eq!(err.message, "Unauthorized");
        assert_eq!(err.status_code, Some(401));
    }

    #[test]
    fn test_plain_text_body_falls_back() {
        let err = ApiError::from_response(500, "Internal Server Error");
        assert_eq!(err.code, HTTP_ERROR);
        assert_eq!(err.message, "HTTP 500: Internal Server Error");
        assert_eq!(err.status_code, Some(500));
    }

    #[test]
    fn test_json_missing_fields_falls_back() {
        let err = ApiError::from_response(502, r#"{"error":"bad gateway"}"#);
        assert_eq!(err.code, HTTP_ERROR);
        assert!(err.message.contains("502"));
        assert!(err.message.contains("bad gateway"));
    }

    #[test]
    fn test_non_string_code_falls_back() {
        let err = ApiError::from_response(400, r#"{"code":42,"message":"nope"}"#);
        assert_eq!(err.code, HTTP_ERROR);
    }

    #[test]
    fn test_empty_body_falls_back() {
        let err = ApiError::from_response(503, "");
        assert_eq!(err.code, HTTP_ERROR);
        assert_eq!(err.message, "HTTP 503: ");
    }

    #[test]
    fn test_local_errors_have_no_status() {
        let err = ApiError::no_credential("no credential configured");
        assert!(err.is_local());
        assert_eq!(err.code, NO_CREDENTIAL_CONFIGURED);
    }

    #[test]
    fn test_display_includes_code_and_message() {
        let err = ApiError::new("TOO_MANY_REQUESTS", "slow down", Some(429));
        assert_eq!(err.to_string(), "TOO_MANY_REQUESTS: slow down");
    }

    proptest! {
        #[test]
        fn prop_structured_bodies_round_trip(
            status in 400u16..600,
            code in "[A-Z_]{1,24}",
            message in "[ -~]{0,64}",
        ) {
            let body = serde_json::json!({ "code": &code, "message": &message }).to_string();
            let err = ApiError::from_response(status, &body);
            prop_assert_eq!(err.code, code);
            prop_assert_eq!(err.message, message);
            prop_assert_eq!(err.status_code, Some(status));
        }

        #[test]
        fn prop_unparseable_bodies_embed_status(
            status in 400u16..600,
            body in "[a-zA-Z <>/]{0,64}",
        ) {
            let err = ApiError::from_response(status, &body);
            prop_assert_eq!(err.code.as_str(), HTTP_ERROR);
            prop_assert!(err.message.contains(&status.to_string()));
            prop_assert_eq!(err.status_code, Some(status));
        }
    }
}
