//! 1Panel AppStore manifest schema
//!
//! An AppStore app is a directory `<key>/` holding the app `data.yml`, and
//! one `<key>/<version>/` directory per version with the install form
//! (`data.yml`) and the compose file that 1Panel deploys.
//!
//! # Example `<key>/<version>/data.yml`
//!
//! ```yaml
//! additionalProperties:
//!   formFields:
//!     - default: 8080
//!       edit: true
//!       envKey: PANEL_APP_PORT_HTTP
//!       labelEn: Port
//!       labelZh: 端口
//!       required: true
//!       rule: paramPort
//!       type: number
//! ```

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::compose::ComposeFile;

/// Env key 1Panel fills with the installed container name.
pub const CONTAINER_NAME_KEY: &str = "CONTAINER_NAME";
/// External network every 1Panel app joins.
pub const PANEL_NETWORK: &str = "1panel-network";
/// Label 1Panel uses to recognize app containers.
pub const CREATED_BY_LABEL: &str = "createdBy";
pub const CREATED_BY_VALUE: &str = "Apps";

/// App-level `data.yml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppDefinition {
    pub name: String,
    pub tags: Vec<String>,
    pub title: String,
    pub description: String,
    #[serde(rename = "additionalProperties")]
    pub additional_properties: AppProperties,
}

/// `additionalProperties` of the app `data.yml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppProperties {
    pub key: String,
    pub name: String,
    pub tags: Vec<String>,
    pub short_desc_zh: String,
    pub short_desc_en: String,
    #[serde(rename = "type")]
    pub app_type: String,
    pub cross_version_update: bool,
    pub limit: u32,
    pub recommend: u32,
    pub website: String,
    pub github: String,
    pub document: String,
}

/// Version-level `data.yml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionDefinition {
    #[serde(rename = "additionalProperties")]
    pub additional_properties: FormFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFields {
    pub form_fields: Vec<FormField>,
}

/// Input widget type of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Password,
}

/// One install-time parameter exposed by 1Panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub default: Value,
    pub edit: bool,
    pub env_key: String,
    pub label_en: String,
    pub label_zh: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FormField {
    /// A published host port.
    pub fn port(
        env_key: impl Into<String>,
        label_en: impl Into<String>,
        label_zh: impl Into<String>,
        default: Value,
    ) -> Self {
        Self {
            default,
            edit: true,
            env_key: env_key.into(),
            label_en: label_en.into(),
            label_zh: label_zh.into(),
            required: true,
            rule: Some("paramPort".to_string()),
            field_type: FieldType::Number,
        }
    }

    /// A free-form variable; secrets get a password input.
    pub fn variable(env_key: impl Into<String>, default: Option<&str>) -> Self {
        let env_key = env_key.into();
        let field_type = if is_secret_name(&env_key) {
            FieldType::Password
        } else {
            FieldType::Text
        };
        Self {
            default: Value::String(default.unwrap_or_default().to_string()),
            edit: true,
            label_en: env_key.clone(),
            label_zh: env_key.clone(),
            env_key,
            required: true,
            rule: None,
            field_type,
        }
    }

    /// Default rendered as the string substituted into the compose file.
    pub fn default_string(&self) -> String {
        match &self.default {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => String::new(),
        }
    }
}

fn is_secret_name(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    ["PASSWORD", "PASSWD", "SECRET", "TOKEN"]
        .iter()
        .any(|marker| upper.contains(marker))
        || upper.ends_with("_KEY")
}

/// A file of a rendered package, relative to the AppStore `apps/` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFile {
    pub path: String,
    pub contents: String,
}

/// A complete AppStore app produced from one compose document.
#[derive(Debug, Clone, PartialEq)]
pub struct AppStorePackage {
    pub app: AppDefinition,
    pub version: String,
    pub form: VersionDefinition,
    pub compose: ComposeFile,
}

impl AppStorePackage {
    pub fn key(&self) -> &str {
        &self.app.additional_properties.key
    }

    pub fn form_fields(&self) -> &[FormField] {
        &self.form.additional_properties.form_fields
    }

    pub fn form_field(&self, env_key: &str) -> Option<&FormField> {
        self.form_fields().iter().find(|f| f.env_key == env_key)
    }
}
