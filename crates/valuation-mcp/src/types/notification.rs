//! MCP notification types.

use serde::{Deserialize, Serialize};

use super::message::RequestId;

pub const NOTIFY_INITIALIZED: &str = "notifications/initialized";
pub const NOTIFY_INITIALIZED_LEGACY: &str = "initialized";
pub const NOTIFY_CANCELLED: &str = "notifications/cancelled";
pub const NOTIFY_CANCEL_REQUEST: &str = "$/cancelRequest";

/// Params of a cancellation notification.
///
/// MCP clients send `requestId`; LSP-style clients send `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelledParams {
    #[serde(rename = "requestId", alias = "id")]
    pub request_id: RequestId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
