//! Compose YAML parsing
//!
//! Parsing is structural only: every construct that is well-formed compose
//! is accepted here, and the mapping layer decides what the AppStore format
//! can represent.

use serde_yaml::{Mapping, Value};
use tracing::debug;

use super::model::{
    ComposeFile, Dependency, EnvVar, PortMapping, Service, VolumeKind, VolumeMount,
};
use crate::error::{ConvertError, Result};
use crate::path::DocPath;
use crate::vars;

const PROTOCOLS: &[&str] = &["tcp", "udp", "sctp"];

/// Parse compose source text.
pub fn parse_compose(source: &str) -> Result<ComposeFile> {
    if source.trim().is_empty() {
        return Err(ConvertError::parse("document is empty"));
    }
    let root: Value = serde_yaml::from_str(source)?;
    parse_compose_value(&root)
}

/// Parse an already-loaded YAML document.
pub fn parse_compose_value(root: &Value) -> Result<ComposeFile> {
    let root = root
        .as_mapping()
        .ok_or_else(|| ConvertError::parse("top level must be a mapping"))?;

    let mut compose = ComposeFile::default();
    let mut services = None;

    for (key, value) in root {
        let key = key_str(key, &DocPath::root())?;
        let path = DocPath::root().key(key);
        match key {
            "services" => services = Some(value),
            "name" => compose.name = Some(scalar_string(value, &path)?),
            "volumes" => compose.volumes = mapping_or_empty(value, &path)?,
            "networks" => compose.networks = mapping_or_empty(value, &path)?,
            _ => compose.extra.push((key.to_string(), value.clone())),
        }
    }

    let services_path = DocPath::root().key("services");
    let services = services
        .and_then(Value::as_mapping)
        .ok_or_else(|| ConvertError::parse("`services` must be a mapping"))?;
    if services.is_empty() {
        return Err(ConvertError::parse("`services` must declare at least one service"));
    }

    for (name, body) in services {
        let name = key_str(name, &services_path)?;
        let service = parse_service(name, body, &services_path.key(name))?;
        compose.services.push(service);
    }

    debug!(services = compose.services.len(), "Parsed compose document");
    Ok(compose)
}

fn parse_service(name: &str, body: &Value, path: &DocPath) -> Result<Service> {
    let body = body.as_mapping().ok_or_else(|| {
        ConvertError::parse(format!("{path}: service definition must be a mapping"))
    })?;

    let mut service = Service::new(name);
    for (key, value) in body {
        let key = key_str(key, path)?;
        let path = path.key(key);
        match key {
            "image" => service.image = Some(scalar_string(value, &path)?),
            "build" => service.build = Some(value.clone()),
            "container_name" => service.container_name = Some(scalar_string(value, &path)?),
            "restart" => service.restart = Some(scalar_string(value, &path)?),
            "network_mode" => service.network_mode = Some(scalar_string(value, &path)?),
            "ports" => service.ports = parse_ports(value, &path)?,
            "environment" => {
                service.environment = parse_environment(value, &path)?;
                service.environment_is_list = value.is_sequence();
            }
            "env_file" => service.env_file = parse_string_list(value, &path)?,
            "volumes" => service.volumes = parse_volumes(value, &path)?,
            "depends_on" => service.depends_on = parse_depends_on(value, &path)?,
            "networks" => service.networks = parse_networks(value, &path)?,
            "labels" => service.labels = parse_key_values(value, &path)?,
            _ => service.extra.push((key.to_string(), value.clone())),
        }
    }
    Ok(service)
}

fn parse_ports(value: &Value, path: &DocPath) -> Result<Vec<PortMapping>> {
    sequence(value, path)?
        .iter()
        .enumerate()
        .map(|(i, entry)| parse_port(entry, &path.index(i)))
        .collect()
}

/// Parse one `ports` entry.
pub(crate) fn parse_port(entry: &Value, path: &DocPath) -> Result<PortMapping> {
    match entry {
        Value::Number(n) => Ok(PortMapping::new(None, n.to_string())),
        Value::String(s) => parse_port_short(s, path),
        Value::Mapping(map) => parse_port_long(map, path),
        _ => Err(invalid(path, "port must be a string, number or mapping")),
    }
}

fn parse_port_short(spec: &str, path: &DocPath) -> Result<PortMapping> {
    let (body, protocol) = match spec.rsplit_once('/') {
        Some((body, proto)) if PROTOCOLS.contains(&proto) => (body, Some(proto.to_string())),
        _ => (spec, None),
    };

    let parts = vars::split_outside_braces(body, ':');
    let (host_ip, published, target) = match parts.as_slice() {
        [target] => (None, None, *target),
        [published, target] => (None, Some(*published), *target),
        [ip, published, target] => (Some(*ip), Some(*published), *target),
        _ => return Err(invalid(path, format!("malformed port mapping `{spec}`"))),
    };

    if target.is_empty() {
        return Err(invalid(path, format!("port mapping `{spec}` has no container port")));
    }

    Ok(PortMapping {
        host_ip: host_ip.filter(|ip| !ip.is_empty()).map(str::to_string),
        published: published.filter(|p| !p.is_empty()).map(str::to_string),
        target: target.to_string(),
        protocol,
        dropped: Vec::new(),
    })
}

fn parse_port_long(map: &Mapping, path: &DocPath) -> Result<PortMapping> {
    let mut port = PortMapping::default();
    let mut target = None;
    for (key, value) in map {
        let key = key_str(key, path)?;
        let field_path = path.key(key);
        match key {
            "target" => target = Some(scalar_string(value, &field_path)?),
            "published" => port.published = Some(scalar_string(value, &field_path)?),
            "host_ip" => port.host_ip = Some(scalar_string(value, &field_path)?),
            "protocol" => port.protocol = Some(scalar_string(value, &field_path)?),
            "mode" | "name" | "app_protocol" => port.dropped.push(key.to_string()),
            other => return Err(invalid(path, format!("unknown port attribute `{other}`"))),
        }
    }
    port.target = target.ok_or_else(|| invalid(path, "long port syntax requires `target`"))?;
    Ok(port)
}

fn parse_environment(value: &Value, path: &DocPath) -> Result<Vec<EnvVar>> {
    match value {
        Value::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let entry = scalar_string(item, &path.index(i))?;
                Ok(match entry.split_once('=') {
                    Some((name, value)) => EnvVar::new(name, Some(value)),
                    None => EnvVar::new(entry, None),
                })
            })
            .collect(),
        Value::Mapping(map) => map
            .iter()
            .map(|(name, value)| {
                let name = key_str(name, path)?;
                let value = optional_scalar(value, &path.key(name))?;
                Ok(EnvVar {
                    name: name.to_string(),
                    value,
                })
            })
            .collect(),
        Value::Null => Ok(Vec::new()),
        _ => Err(invalid(path, "environment must be a list or mapping")),
    }
}

fn parse_volumes(value: &Value, path: &DocPath) -> Result<Vec<VolumeMount>> {
    sequence(value, path)?
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let path = path.index(i);
            match entry {
                Value::String(s) => parse_volume_short(s, &path),
                Value::Mapping(map) => parse_volume_long(map, &path),
                _ => Err(invalid(&path, "volume must be a string or mapping")),
            }
        })
        .collect()
}

fn parse_volume_short(spec: &str, path: &DocPath) -> Result<VolumeMount> {
    let parts = vars::split_outside_braces(spec, ':');
    let (source, target, mode) = match parts.as_slice() {
        [target] => (None, *target, None),
        [source, target] => (Some(*source), *target, None),
        [source, target, mode] => (Some(*source), *target, Some(*mode)),
        _ => return Err(invalid(path, format!("malformed volume `{spec}`"))),
    };
    if target.is_empty() {
        return Err(invalid(path, format!("volume `{spec}` has no target")));
    }
    Ok(VolumeMount {
        kind: source.map_or(VolumeKind::Volume, VolumeMount::kind_of_source),
        source: source.map(str::to_string),
        target: target.to_string(),
        mode: mode.map(str::to_string),
        options: Mapping::new(),
    })
}

fn parse_volume_long(map: &Mapping, path: &DocPath) -> Result<VolumeMount> {
    let mut kind = VolumeKind::Volume;
    let mut source = None;
    let mut target = None;
    let mut read_only = false;
    let mut options = Mapping::new();
    for (key, value) in map {
        let key = key_str(key, path)?;
        let field_path = path.key(key);
        match key {
            "type" => {
                kind = match scalar_string(value, &field_path)?.as_str() {
                    "bind" => VolumeKind::Bind,
                    "volume" => VolumeKind::Volume,
                    "tmpfs" => VolumeKind::Tmpfs,
                    other => {
                        return Err(invalid(&field_path, format!("unknown volume type `{other}`")));
                    }
                }
            }
            "source" => source = Some(scalar_string(value, &field_path)?),
            "target" => target = Some(scalar_string(value, &field_path)?),
            "read_only" => {
                read_only = value
                    .as_bool()
                    .ok_or_else(|| invalid(&field_path, "read_only must be a boolean"))?;
            }
            _ => {
                options.insert(key.into(), value.clone());
            }
        }
    }
    let target = target.ok_or_else(|| invalid(path, "long volume syntax requires `target`"))?;
    Ok(VolumeMount {
        kind,
        source,
        target,
        mode: read_only.then(|| "ro".to_string()),
        options,
    })
}

fn parse_depends_on(value: &Value, path: &DocPath) -> Result<Vec<Dependency>> {
    match value {
        Value::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| Ok(Dependency::new(scalar_string(item, &path.index(i))?)))
            .collect(),
        Value::Mapping(map) => map
            .iter()
            .map(|(name, options)| {
                let name = key_str(name, path)?;
                Ok(Dependency {
                    service: name.to_string(),
                    options: mapping_or_empty(options, &path.key(name))?,
                })
            })
            .collect(),
        _ => Err(invalid(path, "depends_on must be a list or mapping")),
    }
}

fn parse_networks(value: &Value, path: &DocPath) -> Result<Vec<String>> {
    match value {
        Value::Mapping(map) => map
            .keys()
            .map(|k| key_str(k, path).map(str::to_string))
            .collect(),
        _ => parse_string_list(value, path),
    }
}

fn parse_key_values(value: &Value, path: &DocPath) -> Result<Vec<(String, String)>> {
    match value {
        Value::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let entry = scalar_string(item, &path.index(i))?;
                Ok(match entry.split_once('=') {
                    Some((k, v)) => (k.to_string(), v.to_string()),
                    None => (entry, String::new()),
                })
            })
            .collect(),
        Value::Mapping(map) => map
            .iter()
            .map(|(k, v)| {
                let k = key_str(k, path)?;
                let v = optional_scalar(v, &path.key(k))?.unwrap_or_default();
                Ok((k.to_string(), v))
            })
            .collect(),
        _ => Err(invalid(path, "expected a list or mapping")),
    }
}

fn parse_string_list(value: &Value, path: &DocPath) -> Result<Vec<String>> {
    match value {
        Value::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| scalar_string(item, &path.index(i)))
            .collect(),
        Value::Null => Ok(Vec::new()),
        other => Ok(vec![scalar_string(other, path)?]),
    }
}

fn sequence<'a>(value: &'a Value, path: &DocPath) -> Result<&'a [Value]> {
    match value {
        Value::Sequence(items) => Ok(items),
        Value::Null => Ok(&[]),
        _ => Err(invalid(path, "expected a list")),
    }
}

fn mapping_or_empty(value: &Value, path: &DocPath) -> Result<Mapping> {
    match value {
        Value::Mapping(map) => Ok(map.clone()),
        Value::Null => Ok(Mapping::new()),
        _ => Err(invalid(path, "expected a mapping")),
    }
}

fn key_str<'a>(key: &'a Value, path: &DocPath) -> Result<&'a str> {
    key.as_str()
        .ok_or_else(|| invalid(path, "mapping keys must be strings"))
}

/// Stringify a scalar node.
pub(crate) fn scalar_string(value: &Value, path: &DocPath) -> Result<String> {
    optional_scalar(value, path)?.ok_or_else(|| invalid(path, "value must not be empty"))
}

fn optional_scalar(value: &Value, path: &DocPath) -> Result<Option<String>> {
    match value {
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Null => Ok(None),
        _ => Err(invalid(path, "expected a scalar value")),
    }
}

fn invalid(path: &DocPath, message: impl Into<String>) -> ConvertError {
    ConvertError::parse(format!("{path}: {}", message.into()))
}
