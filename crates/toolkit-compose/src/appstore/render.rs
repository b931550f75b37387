//! Package rendering

use std::fmt::Write as _;

use serde::Serialize;

use super::model::{AppStorePackage, FieldType, PackageFile};
use crate::compose::render_compose;
use crate::error::{ConvertError, Result};

/// Separator between files in the single-text rendering.
pub const FILE_SEPARATOR: &str = "---\n";

impl AppStorePackage {
    /// The package files, in a fixed order.
    pub fn files(&self) -> Result<Vec<PackageFile>> {
        let key = self.key();
        let version = &self.version;
        Ok(vec![
            PackageFile {
                path: format!("{key}/data.yml"),
                contents: to_yaml(&self.app, "app definition")?,
            },
            PackageFile {
                path: format!("{key}/{version}/data.yml"),
                contents: to_yaml(&self.form, "version form")?,
            },
            PackageFile {
                path: format!("{key}/{version}/docker-compose.yml"),
                contents: render_compose(&self.compose)?,
            },
            PackageFile {
                path: format!("{key}/README.md"),
                contents: render_readme(self),
            },
        ])
    }
}

/// Render the whole package as one text: `# <path>` then the contents,
/// files separated by `---`.
pub fn render_package_text(package: &AppStorePackage) -> Result<String> {
    let files = package.files()?;
    Ok(files
        .iter()
        .map(|file| format!("# {}\n{}", file.path, file.contents))
        .collect::<Vec<_>>()
        .join(FILE_SEPARATOR))
}

fn to_yaml<T: Serialize>(value: &T, what: &str) -> Result<String> {
    serde_yaml::to_string(value).map_err(|e| {
        ConvertError::validation("<root>", format!("failed to render {what}: {e}"))
    })
}

/// A short README listing services and install parameters.
pub fn render_readme(package: &AppStorePackage) -> String {
    let app = &package.app;
    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", app.name);
    let _ = writeln!(out, "{}\n", app.description);

    out.push_str("## Services\n\n");
    out.push_str("| Service | Image | Depends on |\n");
    out.push_str("| --- | --- | --- |\n");
    for service in &package.compose.services {
        let deps: Vec<_> = service
            .depends_on
            .iter()
            .map(|d| d.service.as_str())
            .collect();
        let _ = writeln!(
            out,
            "| {} | {} | {} |",
            service.name,
            service.image.as_deref().unwrap_or("-"),
            if deps.is_empty() {
                "-".to_string()
            } else {
                deps.join(", ")
            }
        );
    }

    if !package.form_fields().is_empty() {
        out.push_str("\n## Parameters\n\n");
        out.push_str("| Key | Default | Type |\n");
        out.push_str("| --- | --- | --- |\n");
        for field in package.form_fields() {
            let default = match field.field_type {
                FieldType::Password if !field.default_string().is_empty() => "******".to_string(),
                _ => field.default_string(),
            };
            let kind = match field.field_type {
                FieldType::Text => "text",
                FieldType::Number => "number",
                FieldType::Password => "password",
            };
            let _ = writeln!(out, "| {} | {} | {} |", field.env_key, default, kind);
        }
    }

    out
}
