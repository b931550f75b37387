//! Tool registry
//!
//! The built-in table in [`builtins`] is the single place where shipped
//! tools are declared; listing, lookup and the CLI all derive from it.

mod builtins;
mod component;
mod store;
mod types;

pub use builtins::{BUILTIN_COUNT, ComposeConverterTool, builtin_descriptors};
pub use component::{LazyComponent, ToolComponent, ToolOutcome};
pub use store::{ToolRegistry, ToolRegistryBuilder};
pub use types::{RoutePath, ToolDescriptor};
