//! Tool registry for Toolkit.
//!
//! Tools are described by a [`ToolDescriptor`] keyed by a URL-safe
//! [`RoutePath`]. Descriptors are collected in a [`ToolRegistryBuilder`];
//! [`ToolRegistryBuilder::build`] is the one-time barrier after which the
//! registry is read-only and can be shared freely between threads.
//!
//! A descriptor's component is loaded lazily on first use and memoized, so
//! listing or searching tools never constructs them.
//!
//! # Example
//!
//! ```
//! use toolkit_registry::ToolRegistry;
//!
//! let registry = ToolRegistry::with_builtins().unwrap();
//! let tool = registry.lookup("docker-compose-to-1panel-appstore").unwrap();
//! assert_eq!(tool.category, "Docker");
//! ```

pub mod error;
pub mod registry;

pub use error::{Error, Result};
pub use registry::{
    BUILTIN_COUNT, ComposeConverterTool, LazyComponent, RoutePath, ToolComponent, ToolDescriptor,
    ToolOutcome, ToolRegistry, ToolRegistryBuilder, builtin_descriptors,
};
