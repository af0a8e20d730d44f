//! Valuation MCP Server — JSON-RPC handler registry, dispatcher, and transports
//! serving valuation analytics to LLM agents.

pub mod catalog;
pub mod config;
pub mod protocol;
pub mod registry;
pub mod resources;
pub mod session;
pub mod tools;
pub mod transport;
pub mod types;

pub use catalog::default_registry;
pub use config::{resolve_listen_addr, TransportConfig};
pub use protocol::Dispatcher;
pub use registry::{handler_fn, Handler, HandlerContext, HandlerDescriptor, HandlerRegistry};
pub use session::Session;
pub use transport::{StdioTransport, TcpTransport};
