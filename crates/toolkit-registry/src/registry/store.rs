//! Tool registry storage

use std::collections::HashMap;

use tracing::debug;

use super::types::{RoutePath, ToolDescriptor};
use crate::error::{Error, Result};

/// Collects tool descriptors before the registry is frozen.
#[derive(Debug, Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<ToolDescriptor>,
    index: HashMap<RoutePath, usize>,
}

impl ToolRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool.
    ///
    /// Fails on a non URL-safe path or a path that is already taken.
    pub fn register(&mut self, descriptor: ToolDescriptor) -> Result<()> {
        descriptor.path.validate()?;
        if self.index.contains_key(&descriptor.path) {
            return Err(Error::DuplicateRoute {
                path: descriptor.path.to_string(),
            });
        }
        debug!(path = %descriptor.path, name = %descriptor.name, "Registered tool");
        self.index
            .insert(descriptor.path.clone(), self.tools.len());
        self.tools.push(descriptor);
        Ok(())
    }

    /// Register several tools, stopping at the first error.
    pub fn register_all(
        &mut self,
        descriptors: impl IntoIterator<Item = ToolDescriptor>,
    ) -> Result<()> {
        descriptors.into_iter().try_for_each(|d| self.register(d))
    }

    /// Freeze the registry.
    pub fn build(self) -> ToolRegistry {
        debug!(count = self.tools.len(), "Tool registry built");
        ToolRegistry {
            tools: self.tools,
            index: self.index,
        }
    }
}

/// Read-only registry of tools, in registration order.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    index: HashMap<RoutePath, usize>,
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::new()
    }

    /// Create a registry pre-populated with all built-in tools.
    pub fn with_builtins() -> Result<Self> {
        let mut builder = Self::builder();
        builder.register_all(super::builtins::builtin_descriptors())?;
        Ok(builder.build())
    }

    /// Find a tool by path; the leading `/` is optional.
    pub fn lookup(&self, path: &str) -> Result<&ToolDescriptor> {
        let route = RoutePath::new(path);
        self.index
            .get(&route)
            .map(|&idx| &self.tools[idx])
            .ok_or_else(|| Error::NotFound {
                path: route.to_string(),
            })
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(&RoutePath::new(path))
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn list_all(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Tools in a category (case-insensitive).
    pub fn by_category(&self, category: &str) -> Vec<&ToolDescriptor> {
        self.tools
            .iter()
            .filter(|t| t.category.eq_ignore_ascii_case(category))
            .collect()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for tool in &self.tools {
            if !seen.contains(&tool.category.as_str()) {
                seen.push(tool.category.as_str());
            }
        }
        seen
    }

    /// Tools whose name, description or keywords contain every term of the
    /// query. An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&ToolDescriptor> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        self.tools.iter().filter(|t| t.matches_all(&terms)).collect()
    }
}
