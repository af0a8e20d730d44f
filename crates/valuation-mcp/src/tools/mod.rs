//! MCP tool implementations.

pub mod ping;
pub mod valuation_dcf;
pub mod valuation_industry_compare;
pub mod valuation_peg;
pub mod valuation_trend;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::registry::HandlerDescriptor;
use crate::types::{McpError, McpResult};

/// Every tool in registration order.
pub fn descriptors() -> Vec<HandlerDescriptor> {
    vec![
        ping::descriptor(),
        valuation_dcf::descriptor(),
        valuation_peg::descriptor(),
        valuation_trend::descriptor(),
        valuation_industry_compare::descriptor(),
    ]
}

/// Deserialize tool arguments. Shape problems the schema did not catch
/// still come back as invalid params.
pub(crate) fn parse_args<T: DeserializeOwned>(args: Value) -> McpResult<T> {
    serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))
}

pub(crate) fn to_result<T: Serialize>(value: &T) -> McpResult<Value> {
    serde_json::to_value(value).map_err(|e| McpError::InternalError(e.to_string()))
}
