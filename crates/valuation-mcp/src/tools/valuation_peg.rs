//! Tool: valuation_peg — PEG ratio with interpretation.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::registry::{handler_fn, HandlerDescriptor};
use crate::types::McpResult;

use super::{parse_args, to_result};

#[derive(Debug, Deserialize)]
struct PegParams {
    pe_ratio: f64,
    growth_rate_pct: f64,
}

pub fn descriptor() -> HandlerDescriptor {
    HandlerDescriptor::tool(
        "valuation_peg",
        "Compute the PEG ratio (P/E divided by earnings growth in percent) and classify it",
        json!({
            "type": "object",
            "properties": {
                "pe_ratio": { "type": "number", "description": "Price to earnings ratio" },
                "growth_rate_pct": { "type": "number", "description": "Expected earnings growth in percent, e.g. 20 for 20%" }
            },
            "required": ["pe_ratio", "growth_rate_pct"]
        }),
        handler_fn(|args: Value, _ctx| async move { execute(args) }),
    )
}

pub fn execute(args: Value) -> McpResult<Value> {
    let params: PegParams = parse_args(args)?;
    let assessment = valuation::peg_ratio(params.pe_ratio, params.growth_rate_pct)?;
    to_result(&assessment)
}
