//! Parameter validation against a JSON Schema subset.
//!
//! Supported keywords: `type`, `properties`, `required`,
//! `additionalProperties` (boolean only), `items`, `enum`, `minimum`,
//! `maximum`, `exclusiveMinimum`, `exclusiveMaximum`, `minItems`,
//! `maxItems`, `minLength`, `maxLength`. Other keywords are ignored.

use serde_json::{Map, Value};

use crate::types::{McpError, McpResult};

/// Validate `value` against `schema`, collecting every violation.
pub fn validate_params(schema: &Value, value: &Value) -> McpResult<()> {
    let mut violations = Vec::new();
    check(schema, value, "", &mut violations);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(McpError::SchemaViolations(violations))
    }
}

fn check(schema: &Value, value: &Value, path: &str, out: &mut Vec<String>) {
    let Some(schema) = schema.as_object() else {
        // `true`, `{}` and anything unrecognised accept all values
        if schema == &Value::Bool(false) {
            out.push(format!("{}: no value is allowed here", display(path)));
        }
        return;
    };

    if let Some(expected) = schema.get("type") {
        if !type_matches(expected, value) {
            out.push(format!(
                "{}: expected {}, got {}",
                display(path),
                describe_type(expected),
                type_name(value)
            ));
            // further keywords would only repeat the mismatch
            return;
        }
    }

    if let Some(Value::Array(allowed)) = schema.get("enum") {
        if !allowed.contains(value) {
            out.push(format!("{}: value is not one of {}", display(path), Value::Array(allowed.clone())));
        }
    }

    match value {
        Value::Object(map) => check_object(schema, map, path, out),
        Value::Array(items) => check_array(schema, items, path, out),
        Value::Number(n) => {
            if let Some(n) = n.as_f64() {
                check_number(schema, n, path, out);
            }
        }
        Value::String(s) => check_string(schema, s, path, out),
        _ => {}
    }
}

fn check_object(schema: &Map<String, Value>, map: &Map<String, Value>, path: &str, out: &mut Vec<String>) {
    if let Some(Value::Array(required)) = schema.get("required") {
        for key in required.iter().filter_map(Value::as_str) {
            if !map.contains_key(key) {
                out.push(format!("{}: missing required property", join(path, key)));
            }
        }
    }

    let properties = schema.get("properties").and_then(Value::as_object);
    let allow_additional = schema
        .get("additionalProperties")
        .and_then(Value::as_bool)
        .unwrap_or(true);

    for (key, child) in map {
        match properties.and_then(|p| p.get(key)) {
            Some(child_schema) => check(child_schema, child, &join(path, key), out),
            None if !allow_additional => {
                out.push(format!("{}: unexpected property", join(path, key)));
            }
            None => {}
        }
    }
}

fn check_array(schema: &Map<String, Value>, items: &[Value], path: &str, out: &mut Vec<String>) {
    if let Some(min) = schema.get("minItems").and_then(Value::as_u64) {
        if (items.len() as u64) < min {
            out.push(format!("{}: expected at least {min} items, got {}", display(path), items.len()));
        }
    }
    if let Some(max) = schema.get("maxItems").and_then(Value::as_u64) {
        if (items.len() as u64) > max {
            out.push(format!("{}: expected at most {max} items, got {}", display(path), items.len()));
        }
    }
    if let Some(item_schema) = schema.get("items") {
        for (i, item) in items.iter().enumerate() {
            check(item_schema, item, &join(path, &i.to_string()), out);
        }
    }
}

fn check_number(schema: &Map<String, Value>, n: f64, path: &str, out: &mut Vec<String>) {
    let bound = |key: &str| schema.get(key).and_then(Value::as_f64);

    if let Some(min) = bound("minimum") {
        if n < min {
            out.push(format!("{}: {n} is less than minimum {min}", display(path)));
        }
    }
    if let Some(max) = bound("maximum") {
        if n > max {
            out.push(format!("{}: {n} is greater than maximum {max}", display(path)));
        }
    }
    if let Some(min) = bound("exclusiveMinimum") {
        if n <= min {
            out.push(format!("{}: {n} must be greater than {min}", display(path)));
        }
    }
    if let Some(max) = bound("exclusiveMaximum") {
        if n >= max {
            out.push(format!("{}: {n} must be less than {max}", display(path)));
        }
    }
}

fn check_string(schema: &Map<String, Value>, s: &str, path: &str, out: &mut Vec<String>) {
    let len = s.chars().count() as u64;
    if let Some(min) = schema.get("minLength").and_then(Value::as_u64) {
        if len < min {
            out.push(format!("{}: expected at least {min} characters", display(path)));
        }
    }
    if let Some(max) = schema.get("maxLength").and_then(Value::as_u64) {
        if len > max {
            out.push(format!("{}: expected at most {max} characters", display(path)));
        }
    }
}

fn type_matches(expected: &Value, value: &Value) -> bool {
    match expected {
        Value::String(t) => single_type_matches(t, value),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| single_type_matches(t, value)),
        _ => true,
    }
}

fn single_type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        "number" => value.is_number(),
        "integer" => match value {
            Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
            _ => false,
        },
        _ => true,
    }
}

fn describe_type(expected: &Value) -> String {
    match expected {
        Value::String(t) => t.clone(),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" or "),
        other => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn join(path: &str, segment: &str) -> String {
    format!("{path}/{segment}")
}

fn display(path: &str) -> &str {
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn violations(schema: Value, value: Value) -> Vec<String> {
        match validate_params(&schema, &value) {
            Ok(()) => Vec::new(),
            Err(McpError::SchemaViolations(v)) => v,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_accepts_valid_object() {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "minLength": 1 },
                "count": { "type": "integer", "minimum": 0 }
            },
            "required": ["name"]
        });
        assert!(validate_params(&schema, &json!({"name": "x", "count": 3})).is_ok());
    }

    #[test]
    fn test_collects_every_violation() {
        let schema = json!({
            "type": "object",
            "properties": {
                "rate": { "type": "number", "exclusiveMinimum": 0 },
                "flows": { "type": "array", "items": { "type": "number" }, "minItems": 2 }
            },
            "required": ["rate", "flows", "label"]
        });
        let v = violations(schema, json!({"rate": 0, "flows": [1, "two"]}));
        assert_eq!(v.len(), 3, "{v:?}");
        assert!(v.contains(&"/label: missing required property".to_string()));
        assert!(v.contains(&"/rate: 0 must be greater than 0".to_string()));
        assert!(v.contains(&"/flows/1: expected number, got string".to_string()));
    }

    #[test]
    fn test_root_type_mismatch() {
        let v = violations(json!({"type": "object"}), json!([1, 2]));
        assert_eq!(v, vec!["/: expected object, got array".to_string()]);
    }

    #[test]
    fn test_integer_vs_number() {
        let schema = json!({"type": "integer"});
        assert!(validate_params(&schema, &json!(5)).is_ok());
        assert!(validate_params(&schema, &json!(5.0)).is_ok());
        assert!(validate_params(&schema, &json!(5.5)).is_err());
    }

    #[test]
    fn test_additional_properties_false() {
        let schema = json!({
            "type": "object",
            "properties": { "a": { "type": "boolean" } },
            "additionalProperties": false
        });
        let v = violations(schema, json!({"a": true, "b": 1}));
        assert_eq!(v, vec!["/b: unexpected property".to_string()]);
    }

    #[test]
    fn test_enum_and_union_types() {
        let schema = json!({ "type": ["string", "null"], "enum": ["pe_ttm", null] });
        assert!(validate_params(&schema, &json!(null)).is_ok());
        assert!(validate_params(&schema, &json!("pe_ttm")).is_ok());
        assert_eq!(violations(schema.clone(), json!("other")).len(), 1);
        assert_eq!(
            violations(schema, json!(3)),
            vec!["/: expected string or null, got number".to_string()]
        );
    }

    #[test]
    fn test_empty_schema_accepts_anything() {
        assert!(validate_params(&json!({}), &json!({"anything": [1, 2, 3]})).is_ok());
    }
}
