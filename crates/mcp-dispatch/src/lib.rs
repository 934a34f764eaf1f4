//! Request-dispatch core of an MCP server.
//!
//! Holds the tool, prompt and resource registries, gates methods on the
//! advertised capabilities, runs the invocation pipelines and emits
//! notifications through a host-supplied transport.

pub mod capabilities;
pub mod config;
pub mod context;
pub mod error;
pub mod instrumentation;
pub mod logging;
pub mod methods;
pub mod prompt;
pub mod registry;
pub mod resource;
pub mod schema;
pub mod server;
pub mod tool;
pub mod types;

pub use capabilities::{InitializeResult, ServerCapabilities};
pub use config::Configuration;
pub use context::ServerContext;
pub use error::{DispatchError, ErrorKind, HandlerError, MethodAlreadyDefined};
pub use instrumentation::Instrumentation;
pub use logging::{LoggingLevel, LoggingMessageNotification};
pub use methods::Method;
pub use prompt::{Prompt, PromptArgument};
pub use resource::{Resource, ResourceTemplate};
pub use schema::InputSchema;
pub use server::{McpServer, McpServerBuilder, NotificationTransport};
pub use tool::{Tool, ToolAnnotations};
pub use types::*;
