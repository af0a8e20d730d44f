//! MCP protocol handling — JSON-RPC decode, validation, and dispatch.

pub mod dispatcher;
pub mod negotiation;
pub mod schema;
pub mod validator;

pub use dispatcher::Dispatcher;
pub use negotiation::NegotiatedCapabilities;
