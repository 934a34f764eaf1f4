//! Wire types for the JSON-RPC layer.

pub mod error;
pub mod message;

pub use error::*;
pub use message::*;
