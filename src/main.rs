//! Sequence MCP server - main entry point.
//!
//! Serves two tools over stdio:
//! - get_accounts: Accounts and balances (access token from the environment)
//! - trigger_rule: Rule triggers (per-rule secret supplied by the caller)

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use sequence_mcp::mcp::McpServer;
use sequence_mcp::tools::{EnvCredentials, ToolDispatcher};
use sequence_mcp::types::{parse_timeout, LogFormat};
use sequence_mcp::Config;

/// MCP server for the Sequence banking API.
///
/// Every flag can also be set through its `SEQUENCE_*` environment variable.
#[derive(Debug, Parser)]
#[command(name = "sequence-mcp", version, about)]
struct Args {
    /// Sequence API base URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Request timeout (humantime, e.g. `30s`).
    #[arg(long, value_parser = parse_duration_arg)]
    timeout: Option<Duration>,

    /// Environment variable holding the access token.
    #[arg(long)]
    token_env: Option<String>,

    /// Log format on stderr: `compact` or `json`.
    #[arg(long)]
    log_format: Option<LogFormat>,
}

fn parse_duration_arg(raw: &str) -> Result<Duration, String> {
    parse_timeout(raw).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration (environment first, flags override)
    let mut config = Config::from_env()?;
    if let Some(base_url) = args.base_url {
        config.client.base_url = base_url;
    }
    if let Some(timeout) = args.timeout {
        config.client.timeout = timeout;
    }
    if let Some(token_env) = args.token_env {
        config.credentials.access_token_env = token_env;
    }
    if let Some(log_format) = args.log_format {
        config.observability.log_format = log_format;
    }
    config.validate()?;

    // Initialize observability
    sequence_mcp::observability::init_tracing(config.observability.log_format);

    let credentials = EnvCredentials::new(config.credentials.access_token_env.clone());
    let dispatcher = ToolDispatcher::new(config.client.clone(), Arc::new(credentials))?;
    let server = McpServer::new(Arc::new(dispatcher));

    let cancel = server.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    tracing::info!(
        base_url = %config.client.base_url,
        timeout = ?config.client.timeout,
        token_env = %config.credentials.access_token_env,
        "Sequence MCP server starting"
    );

    server.serve_stdio().await?;
    Ok(())
}
