//! Resource: server://catalog

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::registry::{handler_fn, CapabilityKind, HandlerDescriptor, HandlerRegistry};
use crate::types::{McpError, McpResult};

pub const URI: &str = "server://catalog";

#[derive(Debug, Clone, Serialize)]
struct CatalogEntry {
    name: String,
    kind: CapabilityKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

/// Describe everything registered so far, plus the catalog itself.
///
/// The registry is frozen once shared, so the snapshot taken here stays
/// accurate as long as this is the last registration.
pub fn descriptor(registry: &HandlerRegistry) -> HandlerDescriptor {
    let description = "Names and kinds of every registered handler";
    let mut entries: Vec<CatalogEntry> = registry
        .list()
        .map(|d| CatalogEntry {
            name: d.name.clone(),
            kind: d.kind,
            description: d.description.clone(),
        })
        .collect();
    entries.push(CatalogEntry {
        name: URI.to_string(),
        kind: CapabilityKind::Resource,
        description: Some(description.to_string()),
    });

    let entries = Arc::new(entries);
    HandlerDescriptor::resource(
        URI,
        description,
        handler_fn(move |_args: Value, _ctx| {
            let entries = entries.clone();
            async move { read(&entries) }
        }),
    )
}

fn read(entries: &[CatalogEntry]) -> McpResult<Value> {
    let handlers = serde_json::to_value(entries).map_err(|e| McpError::InternalError(e.to_string()))?;
    Ok(serde_json::json!({
        "count": entries.len(),
        "handlers": handlers,
    }))
}
