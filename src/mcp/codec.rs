//! Message codec for the MCP stdio transport.
//!
//! Message format: one JSON-RPC message per line, UTF-8, terminated by `\n`.
//! Messages must not contain embedded newlines.
//! ```text
//! {"jsonrpc":"2.0","id":1,"method":"tools/list"}\n
//! ```

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Default cap on a single inbound message.
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Read one line from the stream.
///
/// Returns `None` on clean EOF. The trailing newline is stripped.
/// `max_message_bytes` caps the accepted line length.
pub async fn read_message<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    max_message_bytes: usize,
) -> std::io::Result<Option<String>> {
    let mut line = String::new();
    let limit = u64::try_from(max_message_bytes)
        .unwrap_or(u64::MAX)
        .saturating_add(1);
    let read = (&mut *reader).take(limit).read_line(&mut line).await?;
    if read == 0 {
        return Ok(None);
    }

    if !line.ends_with('\n') && line.len() > max_message_bytes {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Message too large: more than {} bytes", max_message_bytes),
        ));
    }

    let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed_len);
    Ok(Some(line))
}

/// Write one message to the stream, newline-terminated, and flush.
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    message: &Value,
) -> std::io::Result<()> {
    let mut payload = serde_json::to_vec(message)?;
    payload.push(b'\n');
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}
