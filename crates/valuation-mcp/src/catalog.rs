//! The default handler catalog served by the binary.

use crate::registry::HandlerRegistry;
use crate::resources::{assumptions, catalog};
use crate::tools;
use crate::types::McpResult;

/// Build the registry with every built-in tool and resource.
pub fn default_registry() -> McpResult<HandlerRegistry> {
    let mut registry = HandlerRegistry::new();
    for descriptor in tools::descriptors() {
        registry.register(descriptor)?;
    }
    registry.register(assumptions::descriptor())?;

    // last, so its snapshot covers everything above
    let catalog = catalog::descriptor(&registry);
    registry.register(catalog)?;

    tracing::debug!("Default catalog built with {} handler(s)", registry.len());
    Ok(registry)
}
