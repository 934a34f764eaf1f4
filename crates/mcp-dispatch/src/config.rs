//! Server configuration and default/override merging.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ConfigError;
use crate::instrumentation::{Instrumentation, InstrumentationCallback};

pub const LATEST_PROTOCOL_VERSION: &str = "2025-06-18";
pub const SUPPORTED_PROTOCOL_VERSIONS: [&str; 3] = ["2025-06-18", "2025-03-26", "2024-11-05"];

/// Receives every error that passes through the dispatcher or a notification.
///
/// The second argument names what was being handled, e.g. `{"request": ...}`.
pub type ExceptionReporter = Arc<dyn Fn(&anyhow::Error, &Value) + Send + Sync>;

/// Settings for one server. Unset fields fall back to the defaults.
#[derive(Clone, Default)]
pub struct Configuration {
    protocol_version: Option<String>,
    validate_tool_call_arguments: Option<bool>,
    exception_reporter: Option<ExceptionReporter>,
    instrumentation_callback: Option<InstrumentationCallback>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = Some(version.into());
        self
    }

    pub fn with_validate_tool_call_arguments(mut self, enabled: bool) -> Self {
        self.validate_tool_call_arguments = Some(enabled);
        self
    }

    pub fn with_exception_reporter(
        mut self,
        reporter: impl Fn(&anyhow::Error, &Value) + Send + Sync + 'static,
    ) -> Self {
        self.exception_reporter = Some(Arc::new(reporter));
        self
    }

    pub fn with_instrumentation_callback(
        mut self,
        callback: impl Fn(&Instrumentation) + Send + Sync + 'static,
    ) -> Self {
        self.instrumentation_callback = Some(Arc::new(callback));
        self
    }

    /// Read overrides from `MCP_PROTOCOL_VERSION` and
    /// `MCP_VALIDATE_TOOL_CALL_ARGUMENTS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new();
        if let Ok(version) = std::env::var("MCP_PROTOCOL_VERSION") {
            config.protocol_version = Some(version);
        }
        if let Ok(raw) = std::env::var("MCP_VALIDATE_TOOL_CALL_ARGUMENTS") {
            let enabled = match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        var: "MCP_VALIDATE_TOOL_CALL_ARGUMENTS",
                        value: raw,
                    })
                }
            };
            config.validate_tool_call_arguments = Some(enabled);
        }
        Ok(config)
    }

    /// Fields set in `other` win; the rest are kept from `self`.
    pub fn merge(&self, other: &Configuration) -> Configuration {
        Configuration {
            protocol_version: other
                .protocol_version
                .clone()
                .or_else(|| self.protocol_version.clone()),
            validate_tool_call_arguments: other
                .validate_tool_call_arguments
                .or(self.validate_tool_call_arguments),
            exception_reporter: other
                .exception_reporter
                .clone()
                .or_else(|| self.exception_reporter.clone()),
            instrumentation_callback: other
                .instrumentation_callback
                .clone()
                .or_else(|| self.instrumentation_callback.clone()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let version = self.protocol_version();
        if SUPPORTED_PROTOCOL_VERSIONS.contains(&version) {
            Ok(())
        } else {
            Err(ConfigError::UnsupportedProtocolVersion {
                got: version.to_string(),
                supported: SUPPORTED_PROTOCOL_VERSIONS.join(", "),
            })
        }
    }

    pub fn protocol_version(&self) -> &str {
        self.protocol_version
            .as_deref()
            .unwrap_or(LATEST_PROTOCOL_VERSION)
    }

    pub fn validate_tool_call_arguments(&self) -> bool {
        self.validate_tool_call_arguments.unwrap_or(true)
    }

    /// Hand an error to the configured reporter, or log it when none is set.
    pub fn report_exception(&self, error: &anyhow::Error, context: &Value) {
        match &self.exception_reporter {
            Some(reporter) => reporter(error, context),
            None => tracing::error!(context = %context, "{error:#}"),
        }
    }

    pub fn instrument(&self, data: &Instrumentation) {
        if let Some(callback) = &self.instrumentation_callback {
            callback(data);
        }
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("protocol_version", &self.protocol_version())
            .field(
                "validate_tool_call_arguments",
                &self.validate_tool_call_arguments(),
            )
            .field("exception_reporter", &self.exception_reporter.is_some())
            .field(
                "instrumentation_callback",
                &self.instrumentation_callback.is_some(),
            )
            .finish()
    }
}
