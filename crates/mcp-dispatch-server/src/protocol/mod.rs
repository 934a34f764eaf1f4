//! JSON-RPC request handling on top of the dispatch core.

pub mod handler;
pub mod validator;

pub use handler::ProtocolHandler;
