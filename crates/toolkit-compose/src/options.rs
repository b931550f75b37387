//! Conversion options and AppStore metadata
//!
//! Options are plain serde structs so shells can load them from a TOML or
//! YAML file. Every field is optional; missing values are derived from the
//! compose document.
//!
//! # Example TOML
//!
//! ```toml
//! key = "halo"
//! name = "Halo"
//! version = "2.20"
//!
//! [metadata]
//! description = "Open-source website builder"
//! tags = ["Website"]
//! type = "website"
//! website = "https://halo.run"
//! ```

use serde::{Deserialize, Serialize};

/// Tunables for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// App key (directory name in the AppStore)
    pub key: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Version directory name
    pub version: Option<String>,
    /// Service whose first port becomes `PANEL_APP_PORT_HTTP`
    pub primary_service: Option<String>,
    pub metadata: AppMetadata,
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_primary_service(mut self, service: impl Into<String>) -> Self {
        self.primary_service = Some(service.into());
        self
    }
}

/// Descriptive fields of the app `data.yml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub short_desc_zh: Option<String>,
    pub short_desc_en: Option<String>,
    pub tags: Vec<String>,
    #[serde(rename = "type")]
    pub app_type: String,
    pub cross_version_update: bool,
    pub limit: u32,
    pub recommend: u32,
    pub website: String,
    pub github: String,
    pub document: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            short_desc_zh: None,
            short_desc_en: None,
            tags: vec!["Tool".to_string()],
            app_type: "tool".to_string(),
            cross_version_update: true,
            limit: 0,
            recommend: 0,
            website: String::new(),
            github: String::new(),
            document: String::new(),
        }
    }
}
