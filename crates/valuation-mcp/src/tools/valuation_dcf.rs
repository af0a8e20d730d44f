//! Tool: valuation_dcf — Discounted cash flow valuation from free cash flow history.

use serde::Deserialize;
use serde_json::{json, Value};

use valuation::{calculate_dcf, DcfAssumptions, MAX_FORECAST_YEARS};

use crate::registry::{handler_fn, HandlerDescriptor};
use crate::types::McpResult;

use super::{parse_args, to_result};

#[derive(Debug, Deserialize)]
struct DcfParams {
    cash_flows: Vec<f64>,
    #[serde(default)]
    discount_rate: Option<f64>,
    #[serde(default)]
    terminal_growth_rate: Option<f64>,
    #[serde(default)]
    forecast_years: Option<u32>,
    #[serde(default)]
    growth_cap: Option<f64>,
}

impl DcfParams {
    fn assumptions(&self) -> DcfAssumptions {
        let defaults = DcfAssumptions::default();
        DcfAssumptions {
            discount_rate: self.discount_rate.unwrap_or(defaults.discount_rate),
            terminal_growth_rate: self
                .terminal_growth_rate
                .unwrap_or(defaults.terminal_growth_rate),
            forecast_years: self.forecast_years.unwrap_or(defaults.forecast_years),
            growth_cap: self.growth_cap.unwrap_or(defaults.growth_cap),
        }
    }
}

pub fn descriptor() -> HandlerDescriptor {
    HandlerDescriptor::tool(
        "valuation_dcf",
        "Estimate enterprise value from historical free cash flows (oldest first) using a discounted cash flow model",
        json!({
            "type": "object",
            "properties": {
                "cash_flows": {
                    "type": "array",
                    "items": { "type": "number" },
                    "minItems": 2,
                    "description": "Historical free cash flows, oldest first"
                },
                "discount_rate": { "type": "number", "description": "WACC, default 0.10" },
                "terminal_growth_rate": { "type": "number", "description": "Perpetual growth, default 0.025" },
                "forecast_years": { "type": "integer", "minimum": 1, "maximum": MAX_FORECAST_YEARS, "description": "Default 5" },
                "growth_cap": { "type": "number", "description": "Cap on extrapolated growth, default 0.15" }
            },
            "required": ["cash_flows"]
        }),
        handler_fn(|args: Value, _ctx| async move { execute(args) }),
    )
}

pub fn execute(args: Value) -> McpResult<Value> {
    let params: DcfParams = parse_args(args)?;
    let assumptions = params.assumptions();
    tracing::debug!(
        "DCF over {} period(s), r={}, g={}",
        params.cash_flows.len(),
        assumptions.discount_rate,
        assumptions.terminal_growth_rate
    );

    let result = calculate_dcf(&params.cash_flows, &assumptions)?;
    to_result(&result)
}
