//! Application configuration from the environment

use serde::Serialize;

pub const VERSION_VAR: &str = "PACKAGE_VERSION";
pub const BASE_URL_VAR: &str = "BASE_URL";
pub const ENV_VAR: &str = "TOOLKIT_ENV";
pub const COMMIT_SHA_VAR: &str = "LAST_COMMIT_SHA";

/// Build-time and deployment settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    pub version: String,
    pub base_url: String,
    pub env: String,
    pub last_commit_sha: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            base_url: "/".to_string(),
            env: "development".to_string(),
            last_commit_sha: String::new(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from a variable lookup; unset or empty values keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |name: &str, default: String| {
            lookup(name).filter(|v| !v.is_empty()).unwrap_or(default)
        };
        Self {
            version: get(VERSION_VAR, defaults.version),
            base_url: get(BASE_URL_VAR, defaults.base_url),
            env: get(ENV_VAR, defaults.env),
            last_commit_sha: get(COMMIT_SHA_VAR, defaults.last_commit_sha),
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == "production"
    }
}
