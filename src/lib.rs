//! # Sequence MCP - Banking tools over the Model Context Protocol
//!
//! Exposes two operations of the Sequence banking API to MCP hosts:
//! - `get_accounts`: list accounts (Pods, Income Sources, linked accounts)
//!   with their balances, using the user's access token
//! - `trigger_rule`: trigger an automation rule with its per-rule secret
//!
//! ## Architecture
//!
//! ```text
//!   stdin/stdout   ┌──────────────┐   ┌────────────────┐   ┌────────────────┐
//!   JSON-RPC   →   │  McpServer   │ → │ ToolDispatcher │ → │ SequenceClient │ → HTTPS
//!                  │ codec/router │   │ catalog, creds │   │  ApiError      │
//!                  └──────────────┘   └────────────────┘   └────────────────┘
//! ```
//!
//! Every client failure is an [`ApiError`](client::ApiError); every tool call
//! returns an [`Envelope`](tools::Envelope).

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod client;
pub mod mcp;
pub mod tools;
pub mod types;

// Internal utilities
pub mod observability;

pub use client::{ApiError, SequenceClient};
pub use tools::{Envelope, ToolDispatcher};
pub use types::{Config, Error, Result};
