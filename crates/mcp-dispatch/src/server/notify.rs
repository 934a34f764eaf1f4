//! Best-effort notifications to the attached transport.

use serde::Serialize;
use serde_json::{json, Value};

use crate::logging::{LoggingLevel, LoggingMessageNotification};

use super::McpServer;

pub const TOOLS_LIST_CHANGED: &str = "notifications/tools/list_changed";
pub const PROMPTS_LIST_CHANGED: &str = "notifications/prompts/list_changed";
pub const RESOURCES_LIST_CHANGED: &str = "notifications/resources/list_changed";
pub const MESSAGE: &str = "notifications/message";

/// Outbound half of the wire transport, as seen by the server.
pub trait NotificationTransport: Send + Sync {
    fn send_notification(&self, method: &str, params: Option<Value>) -> anyhow::Result<()>;
}

#[derive(Debug, Serialize)]
struct LogMessageParams<'a> {
    level: LoggingLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    logger: Option<&'a str>,
    data: Value,
}

impl McpServer {
    pub fn notify_tools_list_changed(&self) {
        self.send_best_effort(TOOLS_LIST_CHANGED, None, "tools_list_changed");
    }

    pub fn notify_prompts_list_changed(&self) {
        self.send_best_effort(PROMPTS_LIST_CHANGED, None, "prompts_list_changed");
    }

    pub fn notify_resources_list_changed(&self) {
        self.send_best_effort(RESOURCES_LIST_CHANGED, None, "resources_list_changed");
    }

    /// Set the minimum severity forwarded by [`McpServer::notify_log_message`].
    pub fn configure_logging_level(&mut self, threshold: LoggingLevel) {
        tracing::info!("Client log threshold set to {threshold}");
        self.logging = Some(LoggingMessageNotification::new(threshold));
    }

    pub fn logging_threshold(&self) -> Option<LoggingLevel> {
        self.logging.map(|filter| filter.threshold())
    }

    /// Send a `notifications/message` if a threshold is set and `level` meets it.
    pub fn notify_log_message(&self, data: Value, level: LoggingLevel, logger: Option<&str>) {
        let Some(filter) = self.logging else {
            return;
        };
        if !filter.should_notify(level) {
            return;
        }
        let params = LogMessageParams { level, logger, data };
        match serde_json::to_value(params) {
            Ok(params) => self.send_best_effort(MESSAGE, Some(params), "log_message"),
            Err(e) => tracing::warn!("Dropping log message: {e}"),
        }
    }

    fn send_best_effort(&self, method: &str, params: Option<Value>, notification: &str) {
        let Some(transport) = &self.transport else {
            return;
        };
        if let Err(e) = transport.send_notification(method, params) {
            tracing::warn!("Failed to send {method}: {e}");
            self.configuration
                .report_exception(&e, &json!({ "notification": notification }));
        }
    }
}
