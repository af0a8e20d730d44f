//! JSON-RPC 2.0 envelope decoding and validation.

use serde_json::Value;

use crate::types::{
    InboundMessage, JsonRpcNotification, JsonRpcRequest, McpError, McpResult, RequestId,
    JSONRPC_VERSION,
};

/// Decode one frame into a request or notification.
///
/// Anything that cannot be correlated to a request id fails here, before a
/// handler could possibly be invoked.
pub fn parse_inbound(bytes: &[u8]) -> McpResult<InboundMessage> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| McpError::ParseError(e.to_string()))?;

    let mut object = match value {
        Value::Object(map) => map,
        Value::Array(_) => {
            return Err(McpError::InvalidRequest(
                "Batch requests are not supported".to_string(),
            ))
        }
        other => {
            return Err(McpError::InvalidRequest(format!(
                "Expected a JSON object, got {other}"
            )))
        }
    };

    let jsonrpc = match object.remove("jsonrpc") {
        None => JSONRPC_VERSION.to_string(),
        Some(Value::String(v)) => v,
        Some(other) => {
            return Err(McpError::InvalidRequest(format!(
                "jsonrpc must be a string, got {other}"
            )))
        }
    };
    validate_version(&jsonrpc)?;

    let method = match object.remove("method") {
        Some(Value::String(m)) => m,
        Some(_) => {
            return Err(McpError::InvalidRequest(
                "Method name must be a string".to_string(),
            ))
        }
        None => {
            return Err(McpError::InvalidRequest(
                "Missing method name".to_string(),
            ))
        }
    };
    if method.is_empty() {
        return Err(McpError::InvalidRequest(
            "Method name must not be empty".to_string(),
        ));
    }

    let params = object.remove("params");

    match object.remove("id") {
        None => Ok(InboundMessage::Notification(JsonRpcNotification {
            jsonrpc,
            method,
            params,
        })),
        Some(id) => Ok(InboundMessage::Request(JsonRpcRequest {
            jsonrpc,
            id: parse_id(id)?,
            method,
            params,
        })),
    }
}

/// Request ids must be strings or integers.
fn parse_id(id: Value) -> McpResult<RequestId> {
    match id {
        Value::String(s) => Ok(RequestId::String(s)),
        Value::Number(n) => n
            .as_i64()
            .map(RequestId::Number)
            .or_else(|| n.as_u64().map(RequestId::Unsigned))
            .ok_or_else(|| {
                McpError::InvalidRequest(format!("Request id must be an integer, got {n}"))
            }),
        other => Err(McpError::InvalidRequest(format!(
            "Request id must be a string or integer, got {other}"
        ))),
    }
}

/// Validate that a JSON-RPC request is well-formed.
pub fn validate_request(request: &JsonRpcRequest) -> McpResult<()> {
    validate_version(&request.jsonrpc)?;

    if request.method.is_empty() {
        return Err(McpError::InvalidRequest(
            "Method name must not be empty".to_string(),
        ));
    }

    if matches!(request.id, RequestId::Null) {
        return Err(McpError::InvalidRequest(
            "Request id must not be null".to_string(),
        ));
    }

    Ok(())
}

fn validate_version(jsonrpc: &str) -> McpResult<()> {
    if jsonrpc != JSONRPC_VERSION {
        return Err(McpError::InvalidRequest(format!(
            "Expected jsonrpc version \"{JSONRPC_VERSION}\", got \"{jsonrpc}\""
        )));
    }
    Ok(())
}
