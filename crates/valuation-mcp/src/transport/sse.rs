//! HTTP transport — one JSON-RPC message per POST, with auth and /health.
//!
//! Every POST is handled on its own with no session around it, so
//! cancellation notifications have nothing to act on here.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Json as AxumJson, Response},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::protocol::Dispatcher;
use crate::types::{McpError, McpResult, RequestId, ResponseEnvelope};

/// Shared server state passed to all handlers via axum State.
pub struct ServerState {
    pub token: Option<String>,
    pub dispatcher: Dispatcher,
    pub max_body_bytes: usize,
}

/// HTTP transport for web-based MCP clients.
pub struct SseTransport {
    state: Arc<ServerState>,
}

impl SseTransport {
    pub fn new(dispatcher: Dispatcher, token: Option<String>, max_body_bytes: usize) -> Self {
        Self {
            state: Arc::new(ServerState {
                token,
                dispatcher,
                max_body_bytes,
            }),
        }
    }

    /// The routed application, without a listener attached.
    pub fn router(&self) -> Router {
        let state = self.state.clone();
        Router::new()
            .route("/mcp", post(handle_request))
            .layer(middleware::from_fn_with_state(state.clone(), auth_layer))
            .route("/health", get(handle_health))
            .layer(DefaultBodyLimit::max(self.state.max_body_bytes))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Run the HTTP server on the given address.
    pub async fn run(&self, addr: &str) -> McpResult<()> {
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| McpError::Transport(format!("Failed to bind {addr}: {e}")))?;

        tracing::info!("HTTP transport listening on {addr}");

        axum::serve(listener, app)
            .await
            .map_err(|e| McpError::Transport(e.to_string()))?;

        Ok(())
    }
}

/// Auth middleware — checks Bearer token if configured.
/// /health is handled by a separate route that bypasses this layer.
async fn auth_layer(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    request: axum::extract::Request,
    next: middleware::Next,
) -> Response {
    if let Some(expected) = &state.token {
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected);

        if !authorized {
            tracing::warn!("Rejected request with missing or invalid bearer token");
            let body = ResponseEnvelope::failure(RequestId::Null, &McpError::Unauthorized);
            return (StatusCode::UNAUTHORIZED, AxumJson(body.to_value())).into_response();
        }
    }

    next.run(request).await
}

/// Handle one JSON-RPC message. Notifications get `202 Accepted` and no body.
/// Oversize bodies are refused with 413 before they reach here.
async fn handle_request(State(state): State<Arc<ServerState>>, body: Bytes) -> Response {
    match state.dispatcher.handle_frame(&body).await {
        Some(response) => AxumJson(response.to_value()).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Health check endpoint — no auth required.
async fn handle_health(State(state): State<Arc<ServerState>>) -> AxumJson<serde_json::Value> {
    AxumJson(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "handlers": state.dispatcher.registry().len(),
    }))
}
