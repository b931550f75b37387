//! Document paths used to locate nodes in a compose document
//!
//! Paths are dot-separated keys with array indexing, the same notation
//! used in conversion errors and warnings.
//!
//! # Path Syntax
//!
//! - Dot-separated keys: `services.web.image`
//! - Array indexing: `services.web.ports[0]`
//! - Quoted keys for names containing `.`, `[`, `]` or `"`: `services["web.app"].image`
//!
//! # Examples
//!
//! ```
//! use toolkit_compose::path::{DocPath, PathSegment, get_at_path, parse_path};
//!
//! let path = DocPath::root().key("services").key("web").key("ports").index(0);
//! assert_eq!(path.to_string(), "services.web.ports[0]");
//!
//! let doc: serde_yaml::Value = serde_yaml::from_str("services:\n  web:\n    ports: ['80:80']\n").unwrap();
//! let segments = parse_path("services.web.ports[0]");
//! assert_eq!(segments[2], PathSegment::Key("ports".to_string()));
//! assert_eq!(
//!     get_at_path(&doc, &segments),
//!     Some(&serde_yaml::Value::String("80:80".to_string()))
//! );
//! ```

use std::fmt::{self, Write as _};

use serde_yaml::Value;

/// A segment of a path - either a key or an array index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A key in a mapping (e.g., "web" in "services.web")
    Key(String),
    /// An index in a sequence (e.g., 0 in `ports[0]`)
    Index(usize),
}

/// An owned path into a compose document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocPath {
    segments: Vec<PathSegment>,
}

impl DocPath {
    /// The document root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Extend the path with a mapping key.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.into()));
        Self { segments }
    }

    /// Extend the path with a sequence index.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if needs_quoting(key) => {
                    write!(f, "[\"")?;
                    for ch in key.chars() {
                        if ch == '"' || ch == '\\' {
                            f.write_char('\\')?;
                        }
                        f.write_char(ch)?;
                    }
                    write!(f, "\"]")?;
                }
                PathSegment::Key(key) if i == 0 => write!(f, "{key}")?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

fn needs_quoting(key: &str) -> bool {
    key.is_empty() || key.contains(['.', '[', ']', '"', '\\'])
}

/// Parse a path string into segments.
///
/// Supports dot-separated keys, `[n]` indexing and `["key"]` quoting.
/// Malformed indexes are skipped.
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut current_key = String::new();
    let mut chars = path.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if !current_key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut current_key)));
                }
            }
            '[' => {
                if !current_key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut current_key)));
                }
                if chars.peek() == Some(&'"') {
                    chars.next();
                    let mut key = String::new();
                    while let Some(ch) = chars.next() {
                        match ch {
                            '\\' => key.extend(chars.next()),
                            '"' => break,
                            _ => key.push(ch),
                        }
                    }
                    if chars.peek() == Some(&']') {
                        chars.next();
                    }
                    segments.push(PathSegment::Key(key));
                    continue;
                }
                let mut index_str = String::new();
                for ch in chars.by_ref() {
                    if ch == ']' {
                        break;
                    }
                    index_str.push(ch);
                }
                if let Ok(index) = index_str.parse::<usize>() {
                    segments.push(PathSegment::Index(index));
                }
            }
            _ => current_key.push(ch),
        }
    }

    if !current_key.is_empty() {
        segments.push(PathSegment::Key(current_key));
    }

    segments
}

/// Get the node at the given path from a YAML value.
///
/// Returns `None` if the path doesn't exist.
pub fn get_at_path<'a>(value: &'a Value, segments: &[PathSegment]) -> Option<&'a Value> {
    let Some((first, rest)) = segments.split_first() else {
        return Some(value);
    };

    let next_value = match first {
        PathSegment::Key(key) => value.as_mapping()?.get(key.as_str())?,
        PathSegment::Index(idx) => value.as_sequence()?.get(*idx)?,
    };

    get_at_path(next_value, rest)
}
