//! Dispatcher integration tests over the default catalog.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};

use valuation_mcp::default_registry;
use valuation_mcp::protocol::Dispatcher;
use valuation_mcp::registry::{handler_fn, HandlerDescriptor, HandlerRegistry};
use valuation_mcp::types::*;

// ─────────────────────── helpers ───────────────────────

fn default_dispatcher() -> Dispatcher {
    Dispatcher::new(Arc::new(default_registry().unwrap()))
}

fn mcp_request(id: Value, method: &str, params: Value) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params
    }))
    .unwrap()
}

async fn send(dispatcher: &Dispatcher, frame: &[u8]) -> Value {
    dispatcher
        .handle_frame(frame)
        .await
        .expect("expected a response")
        .to_value()
}

// ═══════════════════════════════════════════════════════
// ROUTING
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_ping_by_method_name() {
    let d = default_dispatcher();
    let resp = send(&d, br#"{"jsonrpc":"2.0","id":"1","method":"ping","params":{}}"#).await;
    assert_eq!(resp["id"], json!("1"));
    assert_eq!(resp["result"], json!({"pong": true}));
    assert!(resp.get("error").is_none());
}

#[tokio::test]
async fn test_unknown_method_keeps_id() {
    let d = default_dispatcher();
    let resp = send(&d, br#"{"jsonrpc":"2.0","id":"2","method":"missing","params":{}}"#).await;
    assert_eq!(resp["id"], json!("2"));
    assert_eq!(resp["error"]["kind"], json!("UnknownMethod"));
    assert_eq!(resp["error"]["code"], json!(error_codes::METHOD_NOT_FOUND));
    assert!(resp.get("result").is_none());
}

#[tokio::test]
async fn test_tools_call_wraps_result() {
    let d = default_dispatcher();
    let resp = send(
        &d,
        &mcp_request(
            json!(4),
            "tools/call",
            json!({"name": "valuation_peg", "arguments": {"pe_ratio": 30.0, "growth_rate_pct": 10.0}}),
        ),
    )
    .await;
    let result = &resp["result"];
    assert_eq!(result["structuredContent"]["peg_ratio"], json!(3.0));
    assert_eq!(result["structuredContent"]["band"], json!("significantly_overvalued"));
    assert_eq!(result["content"][0]["type"], json!("text"));
}

#[tokio::test]
async fn test_tools_call_cannot_reach_resources() {
    let d = default_dispatcher();
    let resp = send(
        &d,
        &mcp_request(json!(5), "tools/call", json!({"name": "server://catalog"})),
    )
    .await;
    assert_eq!(resp["error"]["kind"], json!("UnknownMethod"));
}

#[tokio::test]
async fn test_listings_follow_registration_order() {
    let d = default_dispatcher();
    let tools = send(&d, &mcp_request(json!(6), "tools/list", json!({}))).await;
    let names: Vec<&str> = tools["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "ping",
            "valuation_dcf",
            "valuation_peg",
            "valuation_trend",
            "valuation_industry_compare"
        ]
    );
    assert!(tools["result"]["tools"][1]["inputSchema"]["required"].is_array());

    let resources = send(&d, &mcp_request(json!(7), "resources/list", json!({}))).await;
    assert_eq!(resources["result"]["resources"].as_array().unwrap().len(), 2);
    assert_eq!(
        resources["result"]["resources"][0]["uri"],
        json!("valuation://assumptions")
    );
}

#[tokio::test]
async fn test_resource_read() {
    let d = default_dispatcher();
    let resp = send(
        &d,
        &mcp_request(json!(8), "resources/read", json!({"uri": "valuation://assumptions"})),
    )
    .await;
    let content = &resp["result"]["contents"][0];
    assert_eq!(content["uri"], json!("valuation://assumptions"));
    assert_eq!(content["mimeType"], json!("application/json"));
    let body: Value = serde_json::from_str(content["text"].as_str().unwrap()).unwrap();
    assert_eq!(body["dcf"]["forecast_years"], json!(5));
}

#[tokio::test]
async fn test_initialize_reports_server() {
    let d = default_dispatcher();
    let resp = send(
        &d,
        &mcp_request(
            json!(0),
            "initialize",
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": { "name": "test-client", "version": "1.0" }
            }),
        ),
    )
    .await;
    assert_eq!(resp["result"]["protocolVersion"], json!(MCP_VERSION));
    assert_eq!(resp["result"]["serverInfo"]["name"], json!(SERVER_NAME));
}

// ═══════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_malformed_input_never_reaches_a_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let mut registry = HandlerRegistry::new();
    registry
        .register(HandlerDescriptor::tool(
            "count",
            "Counts invocations",
            json!({}),
            handler_fn(move |_params: Value, _ctx| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, McpError>(json!({}))
                }
            }),
        ))
        .unwrap();
    let d = Dispatcher::new(Arc::new(registry));

    let frames: [&[u8]; 6] = [
        br#"{"jsonrpc":"2.0","id":1,"method":"count""#,
        br#"[{"jsonrpc":"2.0","id":1,"method":"count"}]"#,
        br#"{"jsonrpc":"1.0","id":1,"method":"count"}"#,
        br#"{"jsonrpc":"2.0","id":1,"method":7}"#,
        br#"{"jsonrpc":"2.0","id":1.5,"method":"count"}"#,
        br#""count""#,
    ];
    for frame in frames {
        let resp = send(&d, frame).await;
        assert_eq!(resp["error"]["kind"], json!("MalformedRequest"), "{resp}");
        assert!(resp["id"].is_null());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    send(&d, br#"{"jsonrpc":"2.0","id":1,"method":"count"}"#).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_invalid_params_keep_id_and_list_violations() {
    let d = default_dispatcher();
    let resp = send(
        &d,
        &mcp_request(json!("9"), "valuation_dcf", json!({"cash_flows": [1.0], "forecast_years": 0})),
    )
    .await;
    assert_eq!(resp["id"], json!("9"));
    assert_eq!(resp["error"]["kind"], json!("InvalidParams"));
    let violations = resp["error"]["data"]["violations"].as_array().unwrap();
    assert_eq!(violations.len(), 2, "{violations:?}");
}

#[tokio::test]
async fn test_domain_failure_is_handler_error() {
    let d = default_dispatcher();
    let resp = send(
        &d,
        &mcp_request(
            json!(10),
            "valuation_industry_compare",
            json!({"target": "X", "peers": [{"code": "A", "pe_ttm": 1.0}, {"code": "B"}]}),
        ),
    )
    .await;
    assert_eq!(resp["error"]["kind"], json!("HandlerError"));
    assert_eq!(resp["error"]["code"], json!(mcp_error_codes::HANDLER_FAILED));
}

#[tokio::test]
async fn test_notifications_get_no_response() {
    let d = default_dispatcher();
    assert!(d
        .handle_frame(br#"{"jsonrpc":"2.0","method":"notifications/cancelled","params":{"requestId":1}}"#)
        .await
        .is_none());
}

// ═══════════════════════════════════════════════════════
// ENVELOPES
// ═══════════════════════════════════════════════════════

#[test]
fn test_envelope_decodes_back_to_same_variant() {
    let ok = ResponseEnvelope::success(RequestId::from("a"), json!({"x": 1}));
    let back: ResponseEnvelope = serde_json::from_value(ok.to_value()).unwrap();
    assert!(back.is_success());
    assert_eq!(back.id(), &RequestId::from("a"));

    let err = ResponseEnvelope::failure(RequestId::from(3), &McpError::RequestCancelled);
    let back: ResponseEnvelope = serde_json::from_value(err.to_value()).unwrap();
    assert_eq!(back.error_kind(), Some(ErrorKind::Cancelled));
    assert_eq!(back.id(), &RequestId::from(3));
}

#[test]
fn test_envelope_with_result_and_error_is_rejected() {
    let both = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": {},
        "error": {"code": -32000, "message": "x", "kind": "HandlerError"}
    });
    assert!(serde_json::from_value::<ResponseEnvelope>(both).is_err());
}
