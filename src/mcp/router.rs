//! MCP method router — maps JSON-RPC methods onto the tool dispatcher.

use serde_json::{json, Value};

use crate::mcp::protocol::{RpcError, PROTOCOL_VERSION, SERVER_NAME};
use crate::tools::{Envelope, ToolDispatcher};

/// Route one request to its handler.
pub async fn route_request(
    dispatcher: &ToolDispatcher,
    method: &str,
    params: Value,
) -> Result<Value, RpcError> {
    match method {
        "initialize" => Ok(initialize_result()),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({ "tools": dispatcher.describe() })),
        "tools/call" => {
            let name = str_field(&params, "name")?;
            let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);
            let envelope = dispatcher.invoke(&name, arguments).await;
            Ok(call_result(&envelope))
        }
        m if m.starts_with("notifications/") => Ok(Value::Null),
        _ => Err(RpcError::method_not_found(method)),
    }
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": { "listChanged": false },
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

/// Wrap an envelope as an MCP tool result with a single text item.
pub fn call_result(envelope: &Envelope) -> Value {
    json!({
        "content": [{ "type": "text", "text": envelope.render() }],
        "isError": envelope.is_error(),
    })
}

// =============================================================================
// Shared helpers
// =============================================================================

pub fn str_field(body: &Value, key: &str) -> Result<String, RpcError> {
    body.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| RpcError::invalid_params(format!("Missing required field: {}", key)))
}
