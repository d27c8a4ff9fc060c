//! Uniform result of a tool invocation.
//!
//! Every call to [`ToolDispatcher::invoke`](super::ToolDispatcher::invoke)
//! ends in exactly one [`Envelope`], success or failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::ApiError;

/// Outcome of one tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// Tool-specific success payload, rendered as pretty JSON.
    Success(Value),
    /// Plain textual notice (e.g. an unknown tool name).
    Notice(String),
    /// Structured failure.
    Error(ErrorEnvelope),
}

/// Wire shape of every failure: `{error: true, message, code?, status_code?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl Envelope {
    /// Error envelope with a message and nothing else.
    pub fn error(message: impl Into<String>) -> Self {
        Envelope::Error(ErrorEnvelope {
            error: true,
            code: None,
            message: message.into(),
            status_code: None,
        })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Envelope::Error(_))
    }

    /// Render to the text handed back to the caller.
    pub fn render(&self) -> String {
        match self {
            Envelope::Success(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Envelope::Notice(text) => text.clone(),
            Envelope::Error(err) => serde_json::to_string(err).unwrap_or_else(|_| {
                // A struct of strings and integers always serializes.
                format!("{{\"error\":true,\"message\":{:?}}}", err.message)
            }),
        }
    }
}

impl From<&ApiError> for Envelope {
    fn from(err: &ApiError) -> Self {
        Envelope::Error(ErrorEnvelope {
            error: true,
            code: Some(err.code.clone()),
            message: err.message.clone(),
            status_code: err.status_code,
        })
    }
}

impl From<ApiError> for Envelope {
    fn from(err: ApiError) -> Self {
        Envelope::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_success_renders_pretty_json() {
        let text = Envelope::Success(json!({"total_accounts": 0})).render();
        assert_eq!(text, "{\n  \"total_accounts\": 0\n}");
    }

    #[test]
    fn test_notice_renders_verbatim() {
        assert_eq!(Envelope::Notice("Unknown tool: x".into()).render(), "Unknown tool: x");
        assert!(!Envelope::Notice("x".into()).is_error());
    }

    #[test]
    fn test_message_only_error_omits_optional_fields() {
        let rendered: Value = serde_json::from_str(&Envelope::error("boom").render()).unwrap();
        assert_eq!(rendered, json!({"error": true, "message": "boom"}));
    }

    #[test]
    fn test_api_error_renders_all_fields() {
        let envelope = Envelope::from(ApiError::new("TOO_MANY_REQUESTS", "slow down", Some(429)));
        assert!(envelope.is_error());

        let rendered: Value = serde_json::from_str(&envelope.render()).unwrap();
        assert_eq!(
            rendered,
            json!({
                "error": true,
                "code": "TOO_MANY_REQUESTS",
                "message": "slow down",
                "status_code": 429
            })
        );
    }

    #[test]
    fn test_local_api_error_omits_status() {
        let envelope = Envelope::from(ApiError::no_credential("no credential configured"));
        let rendered: Value = serde_json::from_str(&envelope.render()).unwrap();
        assert!(rendered.get("status_code").is_none());
        assert_eq!(rendered["code"], "NO_CREDENTIAL_CONFIGURED");
    }
}
