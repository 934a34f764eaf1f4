//! Host errors and their JSON-RPC error codes.

use mcp_dispatch::{DispatchError, ErrorKind, HandlerError};
use serde_json::{json, Value};

use super::message::{JsonRpcError, RequestId};

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

#[derive(thiserror::Error, Debug)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// The method exists but the server did not enable its capability.
    #[error("{0}")]
    CapabilityNotSupported(String),

    #[error("{message}")]
    InvalidParams { message: String, kind: ErrorKind },

    #[error("{message}")]
    InternalError { message: String, kind: ErrorKind },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    pub fn code(&self) -> i32 {
        use error_codes::*;
        match self {
            McpError::ParseError(_) | McpError::Json(_) => PARSE_ERROR,
            McpError::InvalidRequest(_) => INVALID_REQUEST,
            McpError::MethodNotFound(_) | McpError::CapabilityNotSupported(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams { .. } => INVALID_PARAMS,
            McpError::InternalError { .. } | McpError::Transport(_) | McpError::Io(_) => {
                INTERNAL_ERROR
            }
        }
    }

    /// `{"kind": ...}` for errors that came out of a handler.
    pub fn data(&self) -> Option<Value> {
        match self {
            McpError::InvalidParams { kind, .. } | McpError::InternalError { kind, .. } => {
                Some(json!({ "kind": kind.as_str() }))
            }
            _ => None,
        }
    }

    pub fn to_json_rpc_error(&self, id: RequestId) -> JsonRpcError {
        JsonRpcError::new(id, self.code(), self.to_string(), self.data())
    }
}

impl From<HandlerError> for McpError {
    fn from(e: HandlerError) -> Self {
        let message = e.to_string();
        match e.kind {
            ErrorKind::ToolNotFound
            | ErrorKind::PromptNotFound
            | ErrorKind::MissingRequiredArguments
            | ErrorKind::InvalidSchema => McpError::InvalidParams {
                message,
                kind: e.kind,
            },
            ErrorKind::InternalError | ErrorKind::Custom(_) => McpError::InternalError {
                message,
                kind: e.kind,
            },
        }
    }
}

impl From<DispatchError> for McpError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::MissingRequiredCapability { .. } => {
                McpError::CapabilityNotSupported(e.to_string())
            }
            DispatchError::Handler(handler_error) => handler_error.into(),
        }
    }
}

pub type McpResult<T> = Result<T, McpError>;
