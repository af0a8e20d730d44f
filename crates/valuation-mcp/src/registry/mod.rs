//! Handler registry — method name to executable capability.

pub mod descriptor;
pub mod handler;
pub mod handler_registry;

pub use descriptor::{CapabilityKind, HandlerDescriptor};
pub use handler::{handler_fn, FnHandler, Handler, HandlerContext};
pub use handler_registry::HandlerRegistry;
