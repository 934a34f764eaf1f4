//! Stdio transport: reads JSON-RPC from stdin, writes to stdout.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::protocol::ProtocolHandler;
use crate::types::{McpResult, RequestId};

use super::framing::{self, FrameWriter};

/// Stdio transport for desktop MCP clients.
pub struct StdioTransport {
    handler: ProtocolHandler,
    writer: FrameWriter,
}

impl StdioTransport {
    /// `writer` should be the same one installed on the server as its
    /// notification transport.
    pub fn new(handler: ProtocolHandler, writer: FrameWriter) -> Self {
        Self { handler, writer }
    }

    pub async fn run(&self) -> McpResult<()> {
        self.serve(BufReader::new(tokio::io::stdin())).await
    }

    /// Process lines from `reader` until EOF.
    pub async fn serve<R: AsyncBufRead + Unpin>(&self, mut reader: R) -> McpResult<()> {
        let mut line = String::new();

        tracing::info!("Stdio transport started");

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                tracing::info!("EOF on stdin, shutting down");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match framing::parse_message(trimmed) {
                Ok(msg) => {
                    if let Some(response) = self.handler.handle_message(msg).await {
                        self.writer.write_value(&response)?;
                    }
                }
                Err(e) => {
                    tracing::warn!("Parse error: {e}");
                    let response = serde_json::to_value(e.to_json_rpc_error(RequestId::Null))?;
                    self.writer.write_value(&response)?;
                }
            }
        }

        Ok(())
    }
}
