//! Core types for the tool registry

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::component::LazyComponent;
use crate::error::{Error, Result};

/// Routing key of a tool, always stored with a leading `/`.
///
/// Construction normalizes the leading slash but does not validate;
/// [`RoutePath::validate`] runs when the tool is registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutePath(String);

impl RoutePath {
    pub fn new(path: &str) -> Self {
        let trimmed = path.trim();
        if trimmed.starts_with('/') {
            Self(trimmed.to_string())
        } else {
            Self(format!("/{trimmed}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path without its leading `/`.
    pub fn slug(&self) -> &str {
        &self.0[1..]
    }

    /// Check that every segment is non-empty and uses only unreserved URL
    /// characters.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Error::InvalidRoute {
            path: self.0.clone(),
            reason: reason.to_string(),
        };

        if self.slug().is_empty() {
            return Err(invalid("route is empty"));
        }
        for segment in self.slug().split('/') {
            if segment.is_empty() {
                return Err(invalid("empty path segment"));
            }
            if segment == "." || segment == ".." {
                return Err(invalid("relative path segment"));
            }
            if let Some(c) = segment.chars().find(|c| !is_unreserved(*c)) {
                return Err(invalid(&format!("character `{c}` is not URL-safe")));
            }
        }
        Ok(())
    }
}

fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')
}

impl From<&str> for RoutePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl fmt::Display for RoutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata and lazily-loaded component of one tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub path: RoutePath,
    /// Display name
    pub name: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub category: String,
    pub created_at: NaiveDate,
    /// Opaque icon reference, e.g. `tabler:brand-docker`
    pub icon: Option<String>,
    #[serde(skip)]
    pub component: LazyComponent,
}

impl ToolDescriptor {
    pub fn new(
        path: impl Into<RoutePath>,
        name: impl Into<String>,
        created_at: NaiveDate,
        component: LazyComponent,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            description: String::new(),
            keywords: Vec::new(),
            category: String::new(),
            created_at,
            icon: None,
            component,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// True when every lowercase term occurs in the name, description or a
    /// keyword.
    pub(crate) fn matches_all(&self, terms: &[String]) -> bool {
        let name = self.name.to_lowercase();
        let description = self.description.to_lowercase();
        let keywords: Vec<String> = self.keywords.iter().map(|k| k.to_lowercase()).collect();
        terms.iter().all(|term| {
            name.contains(term.as_str())
                || description.contains(term.as_str())
                || keywords.iter().any(|k| k.contains(term.as_str()))
        })
    }
}
