//! Main request dispatcher — decodes JSON-RPC envelopes, routes to handlers.

use std::sync::Arc;

use serde_json::Value;

use crate::registry::{CapabilityKind, HandlerContext, HandlerDescriptor, HandlerRegistry};
use crate::types::*;

use super::negotiation::NegotiatedCapabilities;
use super::schema::validate_params;
use super::validator::{parse_inbound, validate_request};

/// Routes decoded requests to registered handlers and packages the outcome.
///
/// The dispatcher holds no per-connection state; session-scoped work
/// (negotiation, cancellation bookkeeping) stays with the caller.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Decode one frame. Undecodable input yields a ready-made error
    /// response with a null id.
    pub fn decode(&self, bytes: &[u8]) -> Result<InboundMessage, ResponseEnvelope> {
        parse_inbound(bytes).map_err(|e| {
            tracing::warn!("Malformed request: {e}");
            ResponseEnvelope::failure(RequestId::Null, &e)
        })
    }

    /// Decode and dispatch one frame with no session around it.
    ///
    /// Returns `None` for notifications. `initialize` is answered with the
    /// server's default capabilities since there is no session to record
    /// the client's.
    pub async fn handle_frame(&self, bytes: &[u8]) -> Option<ResponseEnvelope> {
        match self.decode(bytes) {
            Err(response) => Some(response),
            Ok(InboundMessage::Notification(n)) => {
                tracing::debug!("Ignoring notification without session: {}", n.method);
                None
            }
            Ok(InboundMessage::Request(request)) if request.method == "initialize" => {
                let mut caps = NegotiatedCapabilities::default();
                Some(self.initialize(&mut caps, &request))
            }
            Ok(InboundMessage::Request(request)) => {
                let ctx = HandlerContext::detached(request.id.clone());
                Some(self.dispatch(request, ctx).await)
            }
        }
    }

    /// Answer `initialize`, recording the client's side on `caps`.
    pub fn initialize(
        &self,
        caps: &mut NegotiatedCapabilities,
        request: &JsonRpcRequest,
    ) -> ResponseEnvelope {
        let id = request.id.clone();
        let result = request
            .params
            .clone()
            .ok_or_else(|| McpError::InvalidParams("Initialize params required".to_string()))
            .and_then(|p| {
                serde_json::from_value::<InitializeParams>(p)
                    .map_err(|e| McpError::InvalidParams(e.to_string()))
            })
            .and_then(|p| caps.negotiate(p))
            .and_then(|r| {
                serde_json::to_value(r).map_err(|e| McpError::InternalError(e.to_string()))
            });

        match result {
            Ok(value) => ResponseEnvelope::success(id, value),
            Err(e) => ResponseEnvelope::failure(id, &e),
        }
    }

    /// Route, validate, and invoke one request.
    ///
    /// The handler is raced against `ctx.cancellation`; if the token fires
    /// first the handler future is dropped and a `Cancelled` error returned.
    pub async fn dispatch(&self, request: JsonRpcRequest, ctx: HandlerContext) -> ResponseEnvelope {
        let id = request.id.clone();

        if let Err(e) = validate_request(&request) {
            return ResponseEnvelope::failure(id, &e);
        }

        let cancellation = ctx.cancellation.clone();
        let result = tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(McpError::RequestCancelled),
            result = self.route(request, ctx) => result,
        };

        match result {
            Ok(value) => ResponseEnvelope::success(id, value),
            Err(e) => {
                tracing::debug!("Request {id} failed: {e}");
                ResponseEnvelope::failure(id, &e)
            }
        }
    }

    async fn route(&self, request: JsonRpcRequest, ctx: HandlerContext) -> McpResult<Value> {
        tracing::debug!("Dispatching {} (id {})", request.method, request.id);

        match request.method.as_str() {
            "tools/list" => self.handle_tools_list(),
            "resources/list" => self.handle_resources_list(),
            "resources/templates/list" => self.handle_resource_templates_list(),
            "tools/call" => self.handle_tools_call(request.params, ctx).await,
            "resources/read" => self.handle_resources_read(request.params, ctx).await,
            method => {
                let descriptor = self.registry.lookup(method)?;
                let params = request
                    .params
                    .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
                invoke(descriptor, params, ctx).await
            }
        }
    }

    fn handle_tools_list(&self) -> McpResult<Value> {
        let result = ToolListResult {
            tools: self
                .registry
                .tools()
                .map(HandlerDescriptor::to_tool_definition)
                .collect(),
            next_cursor: None,
        };
        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    fn handle_resources_list(&self) -> McpResult<Value> {
        let result = ResourceListResult {
            resources: self
                .registry
                .resources()
                .map(HandlerDescriptor::to_resource_definition)
                .collect(),
            next_cursor: None,
        };
        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    fn handle_resource_templates_list(&self) -> McpResult<Value> {
        let result = ResourceTemplateListResult {
            resource_templates: Vec::new(),
            next_cursor: None,
        };
        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    async fn handle_tools_call(&self, params: Option<Value>, ctx: HandlerContext) -> McpResult<Value> {
        let call_params: ToolCallParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .ok_or_else(|| McpError::InvalidParams("Tool call params required".to_string()))?;

        let descriptor = self
            .registry
            .lookup_kind(&call_params.name, CapabilityKind::Tool)?;
        let args = call_params
            .arguments
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

        let value = invoke(descriptor, args, ctx).await?;
        serde_json::to_value(ToolCallResult::json(value))
            .map_err(|e| McpError::InternalError(e.to_string()))
    }

    async fn handle_resources_read(&self, params: Option<Value>, ctx: HandlerContext) -> McpResult<Value> {
        let read_params: ResourceReadParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .ok_or_else(|| McpError::InvalidParams("Resource read params required".to_string()))?;

        let descriptor = self
            .registry
            .lookup_kind(&read_params.uri, CapabilityKind::Resource)?;

        let value = invoke(descriptor, Value::Object(serde_json::Map::new()), ctx).await?;
        let result = ReadResourceResult {
            contents: vec![ResourceContent::json(&read_params.uri, &value)],
        };
        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }
}

/// Validate against the descriptor's schema, then run its binding.
async fn invoke(descriptor: &HandlerDescriptor, params: Value, ctx: HandlerContext) -> McpResult<Value> {
    validate_params(&descriptor.input_schema, &params)?;
    descriptor
        .binding
        .call(params, ctx)
        .await
        .map_err(into_handler_error)
}

/// Everything a handler returns is a handler failure, except cancellation
/// and late parameter rejections, which keep their own kind.
fn into_handler_error(e: McpError) -> McpError {
    match e {
        McpError::RequestCancelled
        | McpError::InvalidParams(_)
        | McpError::SchemaViolations(_)
        | McpError::HandlerFailed { .. } => e,
        other => McpError::handler(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::handler_fn;
    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    fn dispatcher() -> Dispatcher {
        let mut registry = HandlerRegistry::new();
        registry
            .register(HandlerDescriptor::tool(
                "echo",
                "Echo params",
                json!({"type": "object", "properties": {"v": {"type": "integer"}}}),
                handler_fn(|params: Value, _ctx| async move { Ok::<_, McpError>(params) }),
            ))
            .unwrap();
        Dispatcher::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_params_default_to_empty_object() {
        let d = dispatcher();
        let req = JsonRpcRequest::new("a", "echo", None);
        let resp = d.dispatch(req, HandlerContext::detached("a".into())).await;
        match resp {
            ResponseEnvelope::Success(r) => assert_eq!(r.result, json!({})),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_pre_cancelled_request() {
        let d = dispatcher();
        let token = CancellationToken::new();
        token.cancel();
        let ctx = HandlerContext::new("b".into(), "s", token);
        let resp = d.dispatch(JsonRpcRequest::new("b", "echo", None), ctx).await;
        assert_eq!(resp.error_kind(), Some(ErrorKind::Cancelled));
        assert_eq!(resp.id(), &RequestId::from("b"));
    }

    #[tokio::test]
    async fn test_handle_frame_notification_is_silent() {
        let d = dispatcher();
        assert!(d
            .handle_frame(br#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_large_unsigned_id_is_echoed() {
        let d = dispatcher();
        let resp = d
            .handle_frame(br#"{"jsonrpc":"2.0","id":18446744073709551615,"method":"echo","params":{"v":1}}"#)
            .await
            .unwrap();
        assert_eq!(resp.error_kind(), None);
        assert_eq!(resp.to_value()["id"], json!(u64::MAX));
    }

    #[test]
    fn test_handler_errors_are_wrapped() {
        let e = into_handler_error(McpError::MethodNotFound("inner".into()));
        assert_eq!(e.kind(), ErrorKind::HandlerError);
        let e = into_handler_error(McpError::RequestCancelled);
        assert_eq!(e.kind(), ErrorKind::Cancelled);
    }
}
