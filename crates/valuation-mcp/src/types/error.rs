//! Error types and JSON-RPC error codes for the MCP server.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::message::{JsonRpcError, JsonRpcErrorObject, RequestId, JSONRPC_VERSION};

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// MCP-specific error codes.
pub mod mcp_error_codes {
    /// Server: a handler reported a domain failure.
    pub const HANDLER_FAILED: i32 = -32000;
    pub const REQUEST_CANCELLED: i32 = -32800;
    pub const CONTENT_TOO_LARGE: i32 = -32801;
    pub const TRANSPORT_CLOSED: i32 = -32860;
    pub const DUPLICATE_METHOD: i32 = -32861;

    /// Server: Unauthorized (missing or invalid bearer token).
    pub const UNAUTHORIZED: i32 = -32900;
}

/// The client-visible error taxonomy carried in every error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    MalformedRequest,
    UnknownMethod,
    InvalidParams,
    HandlerError,
    Cancelled,
    TransportClosed,
    DuplicateMethod,
    Unauthorized,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// All errors that can occur in the MCP server.
#[derive(thiserror::Error, Debug)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Duplicate request id: {0} is already in flight")]
    DuplicateRequestId(RequestId),

    #[error("Frame too large: {size} bytes exceeds {max} bytes")]
    FrameTooLarge { size: usize, max: usize },

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Invalid params: {}", .0.join("; "))]
    SchemaViolations(Vec<String>),

    #[error("Handler error: {message}")]
    HandlerFailed {
        message: String,
        data: Option<Value>,
    },

    #[error("Request cancelled")]
    RequestCancelled,

    #[error("Transport closed")]
    TransportClosed,

    #[error("Duplicate method: {0}")]
    DuplicateMethod(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unauthorized — missing or invalid bearer token.
    #[error("Unauthorized")]
    Unauthorized,
}

impl McpError {
    /// Handler failure with a plain message.
    pub fn handler(message: impl Into<String>) -> Self {
        McpError::HandlerFailed {
            message: message.into(),
            data: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            McpError::ParseError(_)
            | McpError::InvalidRequest(_)
            | McpError::DuplicateRequestId(_)
            | McpError::FrameTooLarge { .. } => ErrorKind::MalformedRequest,
            McpError::MethodNotFound(_) => ErrorKind::UnknownMethod,
            McpError::InvalidParams(_) | McpError::SchemaViolations(_) => ErrorKind::InvalidParams,
            McpError::HandlerFailed { .. }
            | McpError::InternalError(_)
            | McpError::Transport(_)
            | McpError::Io(_)
            | McpError::Json(_) => ErrorKind::HandlerError,
            McpError::RequestCancelled => ErrorKind::Cancelled,
            McpError::TransportClosed => ErrorKind::TransportClosed,
            McpError::DuplicateMethod(_) => ErrorKind::DuplicateMethod,
            McpError::Unauthorized => ErrorKind::Unauthorized,
        }
    }

    pub fn code(&self) -> i32 {
        use error_codes::*;
        use mcp_error_codes::*;
        match self {
            McpError::ParseError(_) | McpError::Json(_) => PARSE_ERROR,
            McpError::InvalidRequest(_) | McpError::DuplicateRequestId(_) => INVALID_REQUEST,
            McpError::FrameTooLarge { .. } => CONTENT_TOO_LARGE,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_) | McpError::SchemaViolations(_) => INVALID_PARAMS,
            McpError::HandlerFailed { .. } => HANDLER_FAILED,
            McpError::InternalError(_) | McpError::Transport(_) | McpError::Io(_) => INTERNAL_ERROR,
            McpError::RequestCancelled => REQUEST_CANCELLED,
            McpError::TransportClosed => TRANSPORT_CLOSED,
            McpError::DuplicateMethod(_) => DUPLICATE_METHOD,
            McpError::Unauthorized => UNAUTHORIZED,
        }
    }

    /// Structured detail attached to the error response, if any.
    pub fn data(&self) -> Option<Value> {
        match self {
            McpError::SchemaViolations(violations) => Some(json!({ "violations": violations })),
            McpError::HandlerFailed { data, .. } => data.clone(),
            McpError::DuplicateRequestId(id) => Some(json!({ "id": id })),
            McpError::FrameTooLarge { size, max } => Some(json!({ "size": size, "max": max })),
            _ => None,
        }
    }

    pub fn to_json_rpc_error(&self, id: RequestId) -> JsonRpcError {
        JsonRpcError {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error: JsonRpcErrorObject {
                code: self.code(),
                message: self.to_string(),
                kind: self.kind(),
                data: self.data(),
            },
        }
    }

    /// Whether an I/O failure means the peer has gone away.
    pub fn is_disconnect(err: &std::io::Error) -> bool {
        matches!(
            err.kind(),
            std::io::ErrorKind::BrokenPipe
                | std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::NotConnected
                | std::io::ErrorKind::UnexpectedEof
                | std::io::ErrorKind::WriteZero
        )
    }
}

impl From<valuation::ValuationError> for McpError {
    fn from(e: valuation::ValuationError) -> Self {
        McpError::handler(e.to_string())
    }
}

pub type McpResult<T> = Result<T, McpError>;
