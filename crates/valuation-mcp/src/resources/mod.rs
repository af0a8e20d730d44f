//! MCP resource implementations.

pub mod assumptions;
pub mod catalog;
