//! Resource: valuation://assumptions

use serde_json::{json, Value};

use valuation::DcfAssumptions;

use crate::registry::{handler_fn, HandlerDescriptor};
use crate::types::{McpError, McpResult};

pub const URI: &str = "valuation://assumptions";

pub fn descriptor() -> HandlerDescriptor {
    HandlerDescriptor::resource(
        URI,
        "Default DCF assumptions and the thresholds used to classify PEG and industry levels",
        handler_fn(|_args: Value, _ctx| async { read() }),
    )
}

pub fn read() -> McpResult<Value> {
    let dcf = serde_json::to_value(DcfAssumptions::default())
        .map_err(|e| McpError::InternalError(e.to_string()))?;

    Ok(json!({
        "dcf": dcf,
        "peg_bands": [
            { "band": "negative_growth", "below": 0.0 },
            { "band": "undervalued", "below": 0.5 },
            { "band": "fairly_valued", "up_to": 1.0 },
            { "band": "slightly_overvalued", "up_to": 1.5 },
            { "band": "overvalued", "up_to": 2.0 },
            { "band": "significantly_overvalued", "above": 2.0 }
        ],
        "industry_levels": [
            { "level": "significantly_undervalued", "below_mean_ratio": 0.8 },
            { "level": "slightly_undervalued", "below_mean_ratio": 0.95 },
            { "level": "fair", "up_to_mean_ratio": 1.05 },
            { "level": "slightly_overvalued", "up_to_mean_ratio": 1.2 },
            { "level": "significantly_overvalued", "above_mean_ratio": 1.2 }
        ]
    }))
}
