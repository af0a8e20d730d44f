//! The executable side of a handler descriptor.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::types::{McpResult, RequestId};

/// Per-invocation context handed to every handler.
#[derive(Debug, Clone)]
pub struct HandlerContext {
    pub request_id: RequestId,
    pub session_id: String,
    /// Tripped when the client cancels this request. Long-running handlers
    /// should select on `cancellation.cancelled()`.
    pub cancellation: CancellationToken,
}

impl HandlerContext {
    pub fn new(request_id: RequestId, session_id: &str, cancellation: CancellationToken) -> Self {
        Self {
            request_id,
            session_id: session_id.to_string(),
            cancellation,
        }
    }

    /// A context with a fresh token, for stateless callers.
    pub fn detached(request_id: RequestId) -> Self {
        Self::new(request_id, "detached", CancellationToken::new())
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// A bound capability. Params have already passed schema validation.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, params: Value, ctx: HandlerContext) -> McpResult<Value>;
}

/// Adapter turning an async closure into a [`Handler`].
pub struct FnHandler<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Value, HandlerContext) -> Fut + Send + Sync,
    Fut: Future<Output = McpResult<Value>> + Send,
{
    async fn call(&self, params: Value, ctx: HandlerContext) -> McpResult<Value> {
        (self.f)(params, ctx).await
    }
}

/// Wrap an async closure as a shareable handler binding.
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn Handler>
where
    F: Fn(Value, HandlerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = McpResult<Value>> + Send + 'static,
{
    Arc::new(FnHandler { f })
}
