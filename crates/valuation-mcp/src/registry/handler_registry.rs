//! Handler registration and lookup.

use std::collections::HashMap;

use crate::types::{McpError, McpResult};

use super::descriptor::{CapabilityKind, HandlerDescriptor};

/// Method name to descriptor map.
///
/// Built mutably at startup, then shared as `Arc<HandlerRegistry>`; once
/// shared there is no way to mutate it, so lookups need no locking.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    descriptors: Vec<HandlerDescriptor>,
    index: HashMap<String, usize>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor. Names are unique across tools and resources.
    pub fn register(&mut self, descriptor: HandlerDescriptor) -> McpResult<()> {
        if self.index.contains_key(&descriptor.name) {
            return Err(McpError::DuplicateMethod(descriptor.name));
        }
        tracing::debug!(
            "Registered {:?} handler: {}",
            descriptor.kind,
            descriptor.name
        );
        self.index
            .insert(descriptor.name.clone(), self.descriptors.len());
        self.descriptors.push(descriptor);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> McpResult<&HandlerDescriptor> {
        self.index
            .get(name)
            .map(|&i| &self.descriptors[i])
            .ok_or_else(|| McpError::MethodNotFound(name.to_string()))
    }

    /// Look up a name that must be registered as the given kind.
    pub fn lookup_kind(&self, name: &str, kind: CapabilityKind) -> McpResult<&HandlerDescriptor> {
        match self.lookup(name)? {
            d if d.kind == kind => Ok(d),
            _ => Err(McpError::MethodNotFound(name.to_string())),
        }
    }

    /// All descriptors in registration order. The iterator is lazy and can be
    /// cloned to restart it.
    pub fn list(&self) -> std::slice::Iter<'_, HandlerDescriptor> {
        self.descriptors.iter()
    }

    pub fn tools(&self) -> impl Iterator<Item = &HandlerDescriptor> + Clone {
        self.list().filter(|d| d.kind == CapabilityKind::Tool)
    }

    pub fn resources(&self) -> impl Iterator<Item = &HandlerDescriptor> + Clone {
        self.list().filter(|d| d.kind == CapabilityKind::Resource)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{json, Value};

    use super::*;
    use crate::registry::handler::{handler_fn, Handler};

    fn noop() -> Arc<dyn Handler> {
        handler_fn(|_params: Value, _ctx| async { Ok::<_, McpError>(json!({})) })
    }

    #[test]
    fn test_register_then_lookup() {
        let mut registry = HandlerRegistry::new();
        registry
            .register(HandlerDescriptor::tool("alpha", "first", json!({"type": "object"}), noop()))
            .unwrap();
        registry
            .register(HandlerDescriptor::resource("data://beta", "second", noop()))
            .unwrap();

        let alpha = registry.lookup("alpha").unwrap();
        assert_eq!(alpha.name, "alpha");
        assert_eq!(alpha.kind, CapabilityKind::Tool);
        assert_eq!(alpha.description.as_deref(), Some("first"));
        assert!(registry.contains("data://beta"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = HandlerRegistry::new();
        registry
            .register(HandlerDescriptor::tool("alpha", "first", json!({}), noop()))
            .unwrap();
        let err = registry
            .register(HandlerDescriptor::tool("alpha", "again", json!({}), noop()))
            .unwrap_err();
        assert!(matches!(err, McpError::DuplicateMethod(ref n) if n == "alpha"));

        // the original registration survives
        assert_eq!(registry.lookup("alpha").unwrap().description.as_deref(), Some("first"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_method() {
        let registry = HandlerRegistry::new();
        assert!(matches!(
            registry.lookup("missing"),
            Err(McpError::MethodNotFound(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_lookup_kind_mismatch() {
        let mut registry = HandlerRegistry::new();
        registry
            .register(HandlerDescriptor::resource("data://beta", "res", noop()))
            .unwrap();
        assert!(registry.lookup_kind("data://beta", CapabilityKind::Resource).is_ok());
        assert!(registry.lookup_kind("data://beta", CapabilityKind::Tool).is_err());
    }

    #[test]
    fn test_list_is_ordered_and_restartable() {
        let mut registry = HandlerRegistry::new();
        for name in ["c", "a", "b"] {
            registry
                .register(HandlerDescriptor::tool(name, name, json!({}), noop()))
                .unwrap();
        }
        let iter = registry.list();
        let first: Vec<&str> = iter.clone().map(|d| d.name.as_str()).collect();
        let second: Vec<&str> = iter.map(|d| d.name.as_str()).collect();
        assert_eq!(first, vec!["c", "a", "b"]);
        assert_eq!(first, second);
        assert_eq!(registry.tools().count(), 3);
        assert_eq!(registry.resources().count(), 0);
    }
}
