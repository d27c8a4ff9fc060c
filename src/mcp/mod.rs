//! MCP stdio transport layer.
//!
//! Newline-delimited JSON-RPC 2.0 on stdin/stdout, exposing the tool
//! dispatcher through `initialize`, `tools/list` and `tools/call`.

pub mod codec;
pub mod protocol;
pub mod router;
pub mod server;

pub use server::McpServer;
