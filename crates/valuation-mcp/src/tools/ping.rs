//! Tool: ping — liveness check.

use serde_json::{json, Value};

use crate::registry::{handler_fn, HandlerDescriptor};
use crate::types::{McpError, McpResult};

pub fn descriptor() -> HandlerDescriptor {
    HandlerDescriptor::tool(
        "ping",
        "Check that the server is alive",
        json!({
            "type": "object",
            "properties": {}
        }),
        handler_fn(|_args: Value, _ctx| async { Ok::<_, McpError>(execute()) }),
    )
}

pub fn execute() -> Value {
    json!({ "pong": true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::HandlerContext;

    #[tokio::test]
    async fn test_ping_pongs() {
        let d = descriptor();
        let out: McpResult<Value> = d
            .binding
            .call(json!({}), HandlerContext::detached("1".into()))
            .await;
        assert_eq!(out.unwrap(), json!({"pong": true}));
    }
}
