//! Tool: valuation_trend — Where the latest value of a multiple sits in its history.

use serde::Deserialize;
use serde_json::{json, Value};

use valuation::ValuationMetric;

use crate::registry::{handler_fn, HandlerDescriptor};
use crate::types::McpResult;

use super::{parse_args, to_result};

#[derive(Debug, Deserialize)]
struct TrendParams {
    #[serde(default)]
    metric: Option<ValuationMetric>,
    values: Vec<f64>,
}

pub fn descriptor() -> HandlerDescriptor {
    HandlerDescriptor::tool(
        "valuation_trend",
        "Summarize a valuation multiple's history: mean, range, and where the latest value sits",
        json!({
            "type": "object",
            "properties": {
                "metric": { "type": "string", "enum": ["pe_ttm", "pb_mrq", "ps_ttm"] },
                "values": {
                    "type": "array",
                    "items": { "type": "number" },
                    "minItems": 1,
                    "description": "Observations in time order; the last one is current"
                }
            },
            "required": ["values"]
        }),
        handler_fn(|args: Value, _ctx| async move { execute(args) }),
    )
}

pub fn execute(args: Value) -> McpResult<Value> {
    let params: TrendParams = parse_args(args)?;
    let trend = valuation::metric_trend(&params.values)?;

    let mut out = to_result(&trend)?;
    if let (Some(metric), Some(obj)) = (params.metric, out.as_object_mut()) {
        obj.insert("metric".to_string(), json!(metric.label()));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_with_metric_label() {
        let out = execute(json!({"metric": "pe_ttm", "values": [10.0, 20.0, 30.0]})).unwrap();
        assert_eq!(out["metric"], json!("pe_ttm"));
        assert_eq!(out["current"], json!(30.0));
        assert_eq!(out["mean"], json!(20.0));
        assert_eq!(out["percentile"], json!(100.0));
    }

    #[test]
    fn test_metric_is_optional() {
        let out = execute(json!({"values": [5.0]})).unwrap();
        assert!(out.get("metric").is_none());
        assert_eq!(out["observations"], json!(1));
    }
}
