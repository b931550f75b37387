//! AppStore → compose reverse mapping
//!
//! Resolves the install parameters with their defaults and strips the
//! 1Panel-specific wiring, giving back a plain compose document with the
//! same services and dependency edges.

use std::collections::HashMap;

use serde_yaml::Value;

use crate::appstore::{AppStorePackage, CONTAINER_NAME_KEY, CREATED_BY_LABEL, PANEL_NETWORK};
use crate::compose::{ComposeFile, render_compose};
use crate::error::Result;
use crate::vars;

/// Rebuild a standalone compose document from a package.
pub fn restore_compose(package: &AppStorePackage) -> ComposeFile {
    let mut defaults: HashMap<&str, String> = package
        .form_fields()
        .iter()
        .map(|f| (f.env_key.as_str(), f.default_string()))
        .collect();
    defaults.insert(CONTAINER_NAME_KEY, package.key().to_string());
    let resolve = |s: &str| vars::substitute(s, |name| defaults.get(name).cloned());

    let mut compose = package.compose.clone();
    for service in &mut compose.services {
        service.image = service.image.as_deref().map(resolve);
        service.container_name = service.container_name.as_deref().map(resolve);
        for port in &mut service.ports {
            port.published = port.published.as_deref().map(resolve);
            port.host_ip = port.host_ip.as_deref().map(resolve);
            port.target = resolve(&port.target);
        }
        for var in &mut service.environment {
            var.value = var.value.as_deref().map(resolve);
        }
        for volume in &mut service.volumes {
            volume.source = volume.source.as_deref().map(resolve);
            volume.options.values_mut().for_each(|v| resolve_value(v, &resolve));
        }
        for (_, value) in &mut service.extra {
            resolve_value(value, &resolve);
        }
        service.networks.retain(|n| n != PANEL_NETWORK);
        service.labels.retain(|(k, _)| k != CREATED_BY_LABEL);
    }
    compose.networks.remove(PANEL_NETWORK);
    compose
}

/// [`restore_compose`] rendered to YAML.
pub fn restore_compose_text(package: &AppStorePackage) -> Result<String> {
    render_compose(&restore_compose(package))
}

fn resolve_value(value: &mut Value, resolve: &impl Fn(&str) -> String) {
    match value {
        Value::String(s) => *s = resolve(s),
        Value::Sequence(items) => items.iter_mut().for_each(|v| resolve_value(v, resolve)),
        Value::Mapping(map) => map.values_mut().for_each(|v| resolve_value(v, resolve)),
        _ => {}
    }
}
