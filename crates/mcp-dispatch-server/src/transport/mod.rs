//! Newline-delimited JSON over stdin/stdout.

pub mod framing;
pub mod stdio;

pub use framing::FrameWriter;
pub use stdio::StdioTransport;
