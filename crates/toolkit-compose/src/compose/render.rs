//! Compose YAML rendering with a stable key order

use serde_yaml::{Mapping, Value};

use super::model::{ComposeFile, Service};
use crate::error::{ConvertError, Result};

/// Render a compose document to YAML text.
///
/// The same model always renders to the same bytes: services keep their
/// order and service keys follow a fixed order.
pub fn render_compose(compose: &ComposeFile) -> Result<String> {
    serde_yaml::to_string(&compose_to_value(compose)).map_err(|e| {
        ConvertError::validation("<root>", format!("failed to render compose document: {e}"))
    })
}

/// Build the YAML node for a compose document.
pub fn compose_to_value(compose: &ComposeFile) -> Value {
    let mut root = Mapping::new();
    if let Some(name) = &compose.name {
        root.insert("name".into(), name.clone().into());
    }

    let mut services = Mapping::new();
    for service in &compose.services {
        services.insert(service.name.clone().into(), service_to_value(service));
    }
    root.insert("services".into(), Value::Mapping(services));

    if !compose.volumes.is_empty() {
        root.insert("volumes".into(), Value::Mapping(compose.volumes.clone()));
    }
    if !compose.networks.is_empty() {
        root.insert("networks".into(), Value::Mapping(compose.networks.clone()));
    }
    for (key, value) in &compose.extra {
        root.insert(key.clone().into(), value.clone());
    }
    Value::Mapping(root)
}

fn service_to_value(service: &Service) -> Value {
    let mut out = Mapping::new();
    let mut put = |key: &str, value: Value| {
        out.insert(key.into(), value);
    };

    if let Some(image) = &service.image {
        put("image", image.clone().into());
    }
    if let Some(build) = &service.build {
        put("build", build.clone());
    }
    if let Some(name) = &service.container_name {
        put("container_name", name.clone().into());
    }
    if let Some(restart) = &service.restart {
        put("restart", restart.clone().into());
    }
    if !service.depends_on.is_empty() {
        put("depends_on", depends_on_value(service));
    }
    if let Some(mode) = &service.network_mode {
        put("network_mode", mode.clone().into());
    }
    if !service.networks.is_empty() {
        put("networks", strings(service.networks.iter().cloned()));
    }
    if !service.ports.is_empty() {
        put("ports", strings(service.ports.iter().map(|p| p.to_short())));
    }
    if !service.env_file.is_empty() {
        put("env_file", strings(service.env_file.iter().cloned()));
    }
    if !service.environment.is_empty() {
        let mut env = Mapping::new();
        for var in &service.environment {
            let value = var.value.clone().map_or(Value::Null, Value::String);
            env.insert(var.name.clone().into(), value);
        }
        put("environment", Value::Mapping(env));
    }
    if !service.volumes.is_empty() {
        put(
            "volumes",
            Value::Sequence(service.volumes.iter().map(|v| v.to_value()).collect()),
        );
    }
    if !service.labels.is_empty() {
        let mut labels = Mapping::new();
        for (k, v) in &service.labels {
            labels.insert(k.clone().into(), v.clone().into());
        }
        put("labels", Value::Mapping(labels));
    }
    for (key, value) in &service.extra {
        put(key, value.clone());
    }
    Value::Mapping(out)
}

/// Short list form unless some edge carries options.
fn depends_on_value(service: &Service) -> Value {
    if service.depends_on.iter().all(|d| d.options.is_empty()) {
        return strings(service.depends_on.iter().map(|d| d.service.clone()));
    }
    let mut map = Mapping::new();
    for dep in &service.depends_on {
        let mut options = dep.options.clone();
        if !options.contains_key("condition") {
            options.insert("condition".into(), "service_started".into());
        }
        map.insert(dep.service.clone().into(), Value::Mapping(options));
    }
    Value::Mapping(map)
}

fn strings(items: impl Iterator<Item = String>) -> Value {
    Value::Sequence(items.map(Value::String).collect())
}
