//! Core types for the Sequence MCP server.
//!
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Client, credential and observability configuration

mod config;
mod errors;

pub use config::{
    parse_timeout, ClientConfig, Config, CredentialsConfig, LogFormat, ObservabilityConfig,
    DEFAULT_ACCESS_TOKEN_ENV, DEFAULT_BASE_URL,
};
pub use errors::{Error, Result};
