//! JSON-RPC 2.0 message types used by the MCP transport.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol revision this server implements.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Name advertised in `initialize`.
pub const SERVER_NAME: &str = "sequence-banking";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

/// Inbound request or notification.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub jsonrpc: String,
    /// `None` for notifications, which are never answered.
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl Request {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Parse one raw line, producing a ready-to-send error response on failure.
    pub fn parse(line: &str) -> Result<Self, Value> {
        let value: Value = serde_json::from_str(line)
            .map_err(|e| failure(Value::Null, RpcError::new(PARSE_ERROR, format!("Parse error: {}", e))))?;

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: Request = serde_json::from_value(value)
            .map_err(|e| failure(id.clone(), RpcError::new(INVALID_REQUEST, format!("Invalid request: {}", e))))?;

        if request.jsonrpc != JSONRPC_VERSION {
            return Err(failure(
                id,
                RpcError::new(INVALID_REQUEST, "Invalid request: jsonrpc must be \"2.0\""),
            ));
        }
        Ok(request)
    }
}

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, message)
    }
}

pub fn success(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "result": result,
    })
}

pub fn failure(id: Value, error: RpcError) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "error": error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request() {
        let request = Request::parse(r#"{"jsonrpc":"2.0","id":7,"method":"tools/list"}"#).unwrap();
        assert_eq!(request.id, Some(json!(7)));
        assert_eq!(request.method, "tools/list");
        assert!(request.params.is_null());
        assert!(!request.is_notification());
    }

    #[test]
    fn test_parse_notification() {
        let request =
            Request::parse(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).unwrap();
        assert!(request.is_notification());
    }

    #[test]
    fn test_parse_error() {
        let response = Request::parse("{not json").unwrap_err();
        assert_eq!(response["error"]["code"], PARSE_ERROR);
        assert!(response["id"].is_null());
    }

    #[test]
    fn test_missing_method_is_invalid_request() {
        let response = Request::parse(r#"{"jsonrpc":"2.0","id":"a"}"#).unwrap_err();
        assert_eq!(response["error"]["code"], INVALID_REQUEST);
        assert_eq!(response["id"], "a");
    }

    #[test]
    fn test_wrong_version_is_invalid_request() {
        let response = Request::parse(r#"{"jsonrpc":"1.0","id":1,"method":"ping"}"#).unwrap_err();
        assert_eq!(response["error"]["code"], INVALID_REQUEST);
    }
}
