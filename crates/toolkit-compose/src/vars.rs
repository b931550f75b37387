//! Compose variable references (`${NAME}`, `${NAME:-default}`)

use std::sync::LazyLock;

use regex::Regex;

static VAR_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?:(:?[-?+])([^}]*))?\}")
        .expect("variable reference pattern is valid")
});

/// A single `${...}` reference found in a compose string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarRef {
    pub name: String,
    /// Default for `${NAME:-default}` and `${NAME-default}`
    pub default: Option<String>,
}

/// Find all variable references in a string, in order of appearance.
pub fn find_refs(s: &str) -> Vec<VarRef> {
    VAR_REF
        .captures_iter(s)
        .map(|caps| {
            let op = caps.get(2).map(|m| m.as_str());
            let default = match op {
                Some(":-") | Some("-") => Some(caps.get(3).map_or("", |m| m.as_str()).to_string()),
                _ => None,
            };
            VarRef {
                name: caps[1].to_string(),
                default,
            }
        })
        .collect()
}

/// Parse a string that consists of exactly one variable reference.
pub fn parse_ref(s: &str) -> Option<VarRef> {
    let m = VAR_REF.find(s)?;
    if m.start() != 0 || m.end() != s.len() {
        return None;
    }
    find_refs(s).into_iter().next()
}

/// True when the string contains at least one variable reference.
pub fn has_refs(s: &str) -> bool {
    VAR_REF.is_match(s)
}

/// Replace every reference using `lookup`, falling back to the inline
/// default, and leaving the reference untouched when neither exists.
pub fn substitute(s: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    VAR_REF
        .replace_all(s, |caps: &regex::Captures<'_>| {
            if let Some(value) = lookup(&caps[1]) {
                return value;
            }
            match caps.get(2).map(|m| m.as_str()) {
                Some(":-") | Some("-") => caps.get(3).map_or("", |m| m.as_str()).to_string(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Split on `sep`, ignoring separators inside `${...}` and `[...]`.
pub fn split_outside_braces(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in s.char_indices() {
        match ch {
            '{' | '[' => depth += 1,
            '}' | ']' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}
