//! MCP stdio server — read loop, per-request tasks, single writer.

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::mcp::codec::{read_message, write_message, DEFAULT_MAX_MESSAGE_BYTES};
use crate::mcp::protocol::{self, Request, RpcError, PARSE_ERROR};
use crate::mcp::router;
use crate::tools::ToolDispatcher;

/// Bounded queue between request tasks and the writer.
const OUTBOUND_CAPACITY: usize = 64;

/// MCP server wrapping the tool dispatcher.
#[derive(Debug)]
pub struct McpServer {
    dispatcher: Arc<ToolDispatcher>,
    cancel: CancellationToken,
    max_message_bytes: usize,
}

impl McpServer {
    pub fn new(dispatcher: Arc<ToolDispatcher>) -> Self {
        Self {
            dispatcher,
            cancel: CancellationToken::new(),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }

    pub fn with_max_message_bytes(mut self, max_message_bytes: usize) -> Self {
        self.max_message_bytes = max_message_bytes;
        self
    }

    /// Token that stops the read loop when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Serve on the process's stdin/stdout.
    pub async fn serve_stdio(&self) -> std::io::Result<()> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve until EOF on `reader` or cancellation.
    ///
    /// Requests run concurrently; responses are written in completion order.
    /// In-flight requests are finished before this returns.
    pub async fn serve<R, W>(&self, mut reader: R, writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Value>(OUTBOUND_CAPACITY);
        let writer_task = tokio::spawn(write_loop(writer, rx));
        let mut in_flight = JoinSet::new();
        tracing::info!("MCP server ready on stdio");

        let read_result = loop {
            // Reap finished tasks; a partial read must never be dropped for this.
            while in_flight.try_join_next().is_some() {}

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("MCP server shutting down");
                    break Ok(());
                }
                line = read_message(&mut reader, self.max_message_bytes) => {
                    let line = match line {
                        Ok(Some(line)) => line,
                        Ok(None) => {
                            tracing::info!("Input closed");
                            break Ok(());
                        }
                        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                            tracing::warn!("Rejected inbound message: {}", e);
                            let response = protocol::failure(
                                Value::Null,
                                RpcError::new(PARSE_ERROR, e.to_string()),
                            );
                            if tx.send(response).await.is_err() {
                                break Ok(());
                            }
                            continue;
                        }
                        Err(e) => break Err(e),
                    };

                    if line.trim().is_empty() {
                        continue;
                    }

                    match Request::parse(&line) {
                        Ok(request) => {
                            let dispatcher = self.dispatcher.clone();
                            let tx = tx.clone();
                            in_flight.spawn(async move {
                                if let Some(response) = handle_request(&dispatcher, request).await {
                                    // Receiver gone means the writer already failed.
                                    let _ = tx.send(response).await;
                                }
                            });
                        }
                        Err(response) => {
                            tracing::debug!("Malformed request");
                            if tx.send(response).await.is_err() {
                                break Ok(());
                            }
                        }
                    }
                }
            }
        };

        while in_flight.join_next().await.is_some() {}
        drop(tx);

        let write_result = writer_task
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        read_result.and(write_result)
    }
}

async fn write_loop<W>(mut writer: W, mut rx: mpsc::Receiver<Value>) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = rx.recv().await {
        write_message(&mut writer, &message).await?;
    }
    Ok(())
}

/// Run one request; `None` for notifications.
async fn handle_request(dispatcher: &ToolDispatcher, request: Request) -> Option<Value> {
    let method = request.method.clone();
    tracing::debug!(method = %method, "Handling request");
    let result = router::route_request(dispatcher, &request.method, request.params).await;

    match request.id {
        None => {
            if let Err(e) = result {
                tracing::debug!(method = %method, "Ignoring notification: {}", e.message);
            }
            None
        }
        Some(id) => Some(match result {
            Ok(value) => protocol::success(id, value),
            Err(err) => {
                tracing::debug!(method = %method, code = err.code, "Request failed");
                protocol::failure(id, err)
            }
        }),
    }
}
