//! Routes JSON-RPC messages into [`McpServer::handle`] and maps the outcome
//! back onto JSON-RPC responses.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use mcp_dispatch::McpServer;
use serde_json::Value;

use crate::types::*;

use super::validator::validate_request;

pub struct ProtocolHandler {
    server: Arc<Mutex<McpServer>>,
    initialized: AtomicBool,
}

impl ProtocolHandler {
    pub fn new(server: Arc<Mutex<McpServer>>) -> Self {
        Self {
            server,
            initialized: AtomicBool::new(false),
        }
    }

    /// Shared handle for hosts that register tools while serving.
    pub fn server(&self) -> Arc<Mutex<McpServer>> {
        self.server.clone()
    }

    /// Whether the client has sent `notifications/initialized`.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Returns the serialized response, or `None` for notifications.
    pub async fn handle_message(&self, msg: JsonRpcMessage) -> Option<Value> {
        match msg {
            JsonRpcMessage::Request(req) => Some(self.handle_request(req).await),
            JsonRpcMessage::Notification(notif) => {
                self.handle_notification(notif);
                None
            }
            _ => {
                tracing::warn!("Received unexpected message type from client");
                None
            }
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Value {
        if let Err(e) = validate_request(&request) {
            return serde_json::to_value(e.to_json_rpc_error(request.id)).unwrap_or_default();
        }

        let id = request.id.clone();
        match self.dispatch_request(request).await {
            Ok(value) => serde_json::to_value(JsonRpcResponse::new(id, value)).unwrap_or_default(),
            Err(e) => {
                tracing::debug!("Request {id} failed: {e}");
                serde_json::to_value(e.to_json_rpc_error(id)).unwrap_or_default()
            }
        }
    }

    async fn dispatch_request(&self, request: JsonRpcRequest) -> McpResult<Value> {
        let server = self.server.lock().await;
        match server.handle(&request.method, request.params)? {
            Some(result) => Ok(result),
            None => Err(McpError::MethodNotFound(request.method)),
        }
    }

    fn handle_notification(&self, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            "notifications/initialized" | "initialized" => {
                self.initialized.store(true, Ordering::Release);
                tracing::info!("Client initialized");
            }
            "notifications/cancelled" | "$/cancelRequest" => {
                tracing::info!("Received cancellation notification");
            }
            _ => {
                tracing::debug!("Unknown notification: {}", notification.method);
            }
        }
    }
}
