//! mcp-dispatch-server: serves an `mcp_dispatch::McpServer` over stdio.

pub mod config;
pub mod demo;
pub mod protocol;
pub mod transport;
pub mod types;

pub use config::resolve_configuration;
pub use protocol::ProtocolHandler;
pub use transport::{FrameWriter, StdioTransport};
