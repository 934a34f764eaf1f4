//! Message framing for newline-delimited JSON.

use std::io::Write;
use std::sync::{Arc, Mutex};

use mcp_dispatch::NotificationTransport;
use serde_json::Value;

use crate::types::{JsonRpcMessage, JsonRpcNotification, McpError, McpResult};

/// Parse a single line of text as a JSON-RPC message.
pub fn parse_message(line: &str) -> McpResult<JsonRpcMessage> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(McpError::ParseError("Empty message".to_string()));
    }

    serde_json::from_str(trimmed).map_err(|e| McpError::ParseError(e.to_string()))
}

/// Serialize a value to a JSON line (with trailing newline).
pub fn frame_message(value: &Value) -> McpResult<String> {
    let mut json = serde_json::to_string(value).map_err(McpError::Json)?;
    json.push('\n');
    Ok(json)
}

/// Shared output stream. Responses and server-initiated notifications go
/// through the same lock so frames never interleave.
#[derive(Clone)]
pub struct FrameWriter {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl FrameWriter {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(out))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    pub fn write_value(&self, value: &Value) -> McpResult<()> {
        let framed = frame_message(value)?;
        let mut out = self
            .out
            .lock()
            .map_err(|_| McpError::Transport("output lock poisoned".to_string()))?;
        out.write_all(framed.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

impl NotificationTransport for FrameWriter {
    fn send_notification(&self, method: &str, params: Option<Value>) -> anyhow::Result<()> {
        let value = serde_json::to_value(JsonRpcNotification::new(method, params))?;
        self.write_value(&value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_parse_rejects_blank_and_garbage() {
        assert!(matches!(parse_message("   "), Err(McpError::ParseError(_))));
        assert!(matches!(parse_message("{not json"), Err(McpError::ParseError(_))));
    }

    #[test]
    fn test_frame_is_single_line() {
        let framed = frame_message(&json!({ "a": "line\nbreak" })).unwrap();
        assert!(framed.ends_with('\n'));
        assert_eq!(framed.matches('\n').count(), 1);
    }

    #[test]
    fn test_notifications_are_framed() {
        let buf = SharedBuf::default();
        let writer = FrameWriter::new(buf.clone());
        writer
            .send_notification("notifications/prompts/list_changed", None)
            .unwrap();

        let written = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert_eq!(
            written,
            "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/prompts/list_changed\"}\n"
        );
    }
}
