//! Tool: valuation_industry_compare — Compare a company's multiples with its peers.

use serde::Deserialize;
use serde_json::{json, Value};

use valuation::{compare_industry, PeerValuation};

use crate::registry::{handler_fn, HandlerDescriptor};
use crate::types::McpResult;

use super::{parse_args, to_result};

#[derive(Debug, Deserialize)]
struct CompareParams {
    target: String,
    peers: Vec<PeerValuation>,
}

pub fn descriptor() -> HandlerDescriptor {
    let multiple = json!({ "type": ["number", "null"] });
    HandlerDescriptor::tool(
        "valuation_industry_compare",
        "Compare a company's PE/PB/PS against industry peers (the target must be one of the peers)",
        json!({
            "type": "object",
            "properties": {
                "target": { "type": "string", "minLength": 1, "description": "Code of the company to assess" },
                "peers": {
                    "type": "array",
                    "minItems": 2,
                    "items": {
                        "type": "object",
                        "properties": {
                            "code": { "type": "string" },
                            "name": { "type": ["string", "null"] },
                            "pe_ttm": multiple,
                            "pb_mrq": multiple,
                            "ps_ttm": multiple
                        },
                        "required": ["code"]
                    }
                }
            },
            "required": ["target", "peers"]
        }),
        handler_fn(|args: Value, _ctx| async move { execute(args) }),
    )
}

pub fn execute(args: Value) -> McpResult<Value> {
    let params: CompareParams = parse_args(args)?;
    let comparison = compare_industry(&params.target, &params.peers)?;
    to_result(&comparison)
}
