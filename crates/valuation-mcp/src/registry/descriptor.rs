//! Handler descriptors: name, kind, schema, and binding.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::types::{ResourceDefinition, ToolDefinition};

use super::handler::Handler;

/// Whether a descriptor is invoked as a tool or read as a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityKind {
    Tool,
    Resource,
}

/// A registered capability. Resources use their URI as the name.
#[derive(Clone)]
pub struct HandlerDescriptor {
    pub name: String,
    pub kind: CapabilityKind,
    pub description: Option<String>,
    pub input_schema: Value,
    pub binding: Arc<dyn Handler>,
}

impl std::fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish_non_exhaustive()
    }
}

impl HandlerDescriptor {
    pub fn tool(name: &str, description: &str, input_schema: Value, binding: Arc<dyn Handler>) -> Self {
        Self {
            name: name.to_string(),
            kind: CapabilityKind::Tool,
            description: Some(description.to_string()),
            input_schema,
            binding,
        }
    }

    /// Resources take no arguments beyond the URI.
    pub fn resource(uri: &str, description: &str, binding: Arc<dyn Handler>) -> Self {
        Self {
            name: uri.to_string(),
            kind: CapabilityKind::Resource,
            description: Some(description.to_string()),
            input_schema: json!({ "type": "object" }),
            binding,
        }
    }

    pub fn to_tool_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.clone(),
        }
    }

    pub fn to_resource_definition(&self) -> ResourceDefinition {
        let name = self
            .name
            .split_once("://")
            .map(|(_, rest)| rest.to_string())
            .unwrap_or_else(|| self.name.clone());
        ResourceDefinition {
            uri: self.name.clone(),
            name,
            description: self.description.clone(),
            mime_type: Some("application/json".to_string()),
        }
    }
}
