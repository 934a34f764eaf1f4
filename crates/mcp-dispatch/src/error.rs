//! Error types raised by the dispatcher and its handlers.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

/// Boxed cause carried by a [`HandlerError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Category of a request failure, reported in instrumentation and on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ToolNotFound,
    PromptNotFound,
    MissingRequiredArguments,
    InvalidSchema,
    InternalError,
    /// Raised by host-defined handlers.
    Custom(String),
}

impl ErrorKind {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorKind::ToolNotFound => "tool_not_found",
            ErrorKind::PromptNotFound => "prompt_not_found",
            ErrorKind::MissingRequiredArguments => "missing_required_arguments",
            ErrorKind::InvalidSchema => "invalid_schema",
            ErrorKind::InternalError => "internal_error",
            ErrorKind::Custom(kind) => kind,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A request failure with an explicit kind.
///
/// Handlers may return this directly (it survives `anyhow` round-trips and is
/// recovered with `downcast`); anything else is wrapped into
/// [`ErrorKind::InternalError`] by the dispatcher.
#[derive(thiserror::Error, Debug)]
#[error("{message}")]
pub struct HandlerError {
    pub message: String,
    pub kind: ErrorKind,
    /// Params of the request that failed, when known.
    pub request: Option<Value>,
    #[source]
    pub source: Option<BoxError>,
}

impl HandlerError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            request: None,
            source: None,
        }
    }

    pub fn tool_not_found(name: &str) -> Self {
        Self::new(ErrorKind::ToolNotFound, format!("Tool not found {name}"))
    }

    pub fn prompt_not_found(name: &str) -> Self {
        Self::new(ErrorKind::PromptNotFound, format!("Prompt not found {name}"))
    }

    pub fn missing_required_arguments(missing: &[String]) -> Self {
        Self::new(
            ErrorKind::MissingRequiredArguments,
            format!("Missing required arguments: {}", missing.join(", ")),
        )
    }

    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidSchema, message)
    }

    pub fn internal(message: impl Into<String>, cause: anyhow::Error) -> Self {
        Self::new(ErrorKind::InternalError, message).with_source(cause.into())
    }

    pub fn custom(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Custom(kind.into()), message)
    }

    pub fn with_request(mut self, request: Option<Value>) -> Self {
        self.request = request;
        self
    }

    pub fn with_source(mut self, source: BoxError) -> Self {
        self.source = Some(source);
        self
    }
}

/// Outcome of a failed [`crate::McpServer::handle`] call.
#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    #[error("Server does not support {capability} (required for {method})")]
    MissingRequiredCapability {
        capability: &'static str,
        method: String,
    },

    #[error(transparent)]
    Handler(#[from] HandlerError),
}

impl DispatchError {
    /// The handler error kind, if this failure came from a handler.
    pub fn kind(&self) -> Option<&ErrorKind> {
        match self {
            DispatchError::Handler(e) => Some(&e.kind),
            DispatchError::MissingRequiredCapability { .. } => None,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Method {0} already defined")]
pub struct MethodAlreadyDefined(pub String);

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("protocol_version must be one of {supported}, got {got}")]
    UnsupportedProtocolVersion { got: String, supported: String },

    #[error("invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_kind_names() {
        assert_eq!(ErrorKind::ToolNotFound.to_string(), "tool_not_found");
        assert_eq!(
            ErrorKind::MissingRequiredArguments.to_string(),
            "missing_required_arguments"
        );
        assert_eq!(ErrorKind::Custom("rate_limited".into()).to_string(), "rate_limited");
        assert_eq!(
            serde_json::to_value(ErrorKind::InvalidSchema).unwrap(),
            serde_json::json!("invalid_schema")
        );
    }

    #[test]
    fn test_missing_arguments_message_lists_names() {
        let err = HandlerError::missing_required_arguments(&["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "Missing required arguments: a, b");
    }

    #[test]
    fn test_internal_keeps_cause() {
        let err = HandlerError::internal("Internal error", anyhow::anyhow!("disk on fire"));
        assert_eq!(err.kind, ErrorKind::InternalError);
        assert_eq!(err.source().unwrap().to_string(), "disk on fire");
    }

    #[test]
    fn test_handler_error_survives_anyhow() {
        let err: anyhow::Error = HandlerError::tool_not_found("x").into();
        let back = err.downcast::<HandlerError>().unwrap();
        assert_eq!(back.kind, ErrorKind::ToolNotFound);
    }

    #[test]
    fn test_capability_error_message() {
        let err = DispatchError::MissingRequiredCapability {
            capability: "tools",
            method: "tools/list".into(),
        };
        assert_eq!(
            err.to_string(),
            "Server does not support tools (required for tools/list)"
        );
        assert!(err.kind().is_none());
    }
}
