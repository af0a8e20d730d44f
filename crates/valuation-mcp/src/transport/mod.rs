//! Transport layer for MCP communication.

pub mod connection;
pub mod framing;
#[cfg(feature = "sse")]
pub mod sse;
pub mod stdio;
pub mod tcp;

pub use connection::serve_connection;
#[cfg(feature = "sse")]
pub use sse::SseTransport;
pub use stdio::StdioTransport;
pub use tcp::TcpTransport;
