//! Typed view of a Docker Compose document
//!
//! Only the attributes the converter remaps are modeled; every other
//! service attribute is kept in [`Service::extra`] in source order.

use serde_yaml::{Mapping, Value};

use crate::vars;

/// A parsed compose document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposeFile {
    /// Project name (top-level `name`)
    pub name: Option<String>,
    /// Services in document order
    pub services: Vec<Service>,
    /// Top-level named volumes
    pub volumes: Mapping,
    /// Top-level networks
    pub networks: Mapping,
    /// Other top-level keys in document order
    pub extra: Vec<(String, Value)>,
}

impl ComposeFile {
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.name == name)
    }

    pub fn service_names(&self) -> Vec<&str> {
        self.services.iter().map(|s| s.name.as_str()).collect()
    }

    /// All dependency edges as `(dependent, dependency)` pairs.
    pub fn dependency_edges(&self) -> Vec<(&str, &str)> {
        self.services
            .iter()
            .flat_map(|s| {
                s.depends_on
                    .iter()
                    .map(move |d| (s.name.as_str(), d.service.as_str()))
            })
            .collect()
    }
}

/// One service (unit) definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Service {
    pub name: String,
    pub image: Option<String>,
    pub build: Option<Value>,
    pub container_name: Option<String>,
    pub restart: Option<String>,
    pub ports: Vec<PortMapping>,
    pub environment: Vec<EnvVar>,
    pub env_file: Vec<String>,
    pub volumes: Vec<VolumeMount>,
    pub depends_on: Vec<Dependency>,
    pub network_mode: Option<String>,
    pub networks: Vec<String>,
    pub labels: Vec<(String, String)>,
    /// `environment` was written as a `KEY=value` list
    pub environment_is_list: bool,
    /// Attributes not modeled above, in source order
    pub extra: Vec<(String, Value)>,
}

impl Service {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn env(&self, name: &str) -> Option<&EnvVar> {
        self.environment.iter().find(|e| e.name == name)
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn depends_on_service(&self, name: &str) -> bool {
        self.depends_on.iter().any(|d| d.service == name)
    }
}

/// A port mapping `[host_ip:][published:]target[/protocol]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortMapping {
    pub host_ip: Option<String>,
    pub published: Option<String>,
    pub target: String,
    pub protocol: Option<String>,
    /// Long-syntax keys that have no short-syntax equivalent
    pub dropped: Vec<String>,
}

impl PortMapping {
    pub fn new(published: Option<&str>, target: impl Into<String>) -> Self {
        Self {
            published: published.map(str::to_string),
            target: target.into(),
            ..Default::default()
        }
    }

    /// True when either side is a `a-b` range.
    pub fn is_range(&self) -> bool {
        let has_range = |s: &str| !vars::has_refs(s) && s.contains('-');
        self.published.as_deref().is_some_and(has_range) || has_range(&self.target)
    }

    /// Render in short syntax.
    pub fn to_short(&self) -> String {
        let mut out = String::new();
        if let Some(ip) = &self.host_ip {
            out.push_str(ip);
            out.push(':');
        }
        if let Some(published) = &self.published {
            out.push_str(published);
            out.push(':');
        } else if self.host_ip.is_some() {
            out.push(':');
        }
        out.push_str(&self.target);
        if let Some(protocol) = &self.protocol {
            out.push('/');
            out.push_str(protocol);
        }
        out
    }
}

/// An environment variable; `value: None` means "inherit from the deploy environment".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    pub name: String,
    pub value: Option<String>,
}

impl EnvVar {
    pub fn new(name: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            name: name.into(),
            value: value.map(str::to_string),
        }
    }
}

/// What a volume entry mounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeKind {
    /// Host path
    Bind,
    /// Named or anonymous volume
    Volume,
    /// In-memory mount
    Tmpfs,
}

/// A service volume entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMount {
    pub kind: VolumeKind,
    pub source: Option<String>,
    pub target: String,
    /// Access mode suffix (`ro`, `rw,z`, ...)
    pub mode: Option<String>,
    /// Long-syntax keys without a short form (`bind`, `volume`, `tmpfs`, `consistency`, ...)
    pub options: Mapping,
}

impl VolumeMount {
    /// Classify a short-syntax source.
    pub fn kind_of_source(source: &str) -> VolumeKind {
        if source.starts_with('.')
            || source.starts_with('/')
            || source.starts_with('~')
            || source.starts_with('$')
        {
            VolumeKind::Bind
        } else {
            VolumeKind::Volume
        }
    }

    pub fn is_absolute_bind(&self) -> bool {
        self.kind == VolumeKind::Bind
            && self
                .source
                .as_deref()
                .is_some_and(|s| s.starts_with('/') || s.starts_with('~'))
    }

    /// True when the short syntax would read back as something else.
    pub fn needs_long_syntax(&self) -> bool {
        match self.kind {
            VolumeKind::Tmpfs => true,
            VolumeKind::Bind => {
                !self.options.is_empty()
                    || self
                        .source
                        .as_deref()
                        .is_none_or(|s| Self::kind_of_source(s) != VolumeKind::Bind)
            }
            VolumeKind::Volume => {
                !self.options.is_empty()
                    || self
                        .source
                        .as_deref()
                        .is_some_and(|s| Self::kind_of_source(s) != VolumeKind::Volume)
            }
        }
    }

    /// Render as a YAML node, in short syntax when it round-trips.
    pub fn to_value(&self) -> Value {
        if self.needs_long_syntax() {
            return Value::Mapping(self.to_long());
        }
        let mut out = String::new();
        if let Some(source) = &self.source {
            out.push_str(source);
            out.push(':');
        }
        out.push_str(&self.target);
        if let Some(mode) = &self.mode {
            out.push(':');
            out.push_str(mode);
        }
        Value::String(out)
    }

    fn to_long(&self) -> Mapping {
        let kind = match self.kind {
            VolumeKind::Bind => "bind",
            VolumeKind::Volume => "volume",
            VolumeKind::Tmpfs => "tmpfs",
        };
        let mut long = Mapping::new();
        long.insert("type".into(), kind.into());
        if let Some(source) = &self.source {
            long.insert("source".into(), source.clone().into());
        }
        long.insert("target".into(), self.target.clone().into());
        if self.is_read_only() {
            long.insert("read_only".into(), Value::Bool(true));
        }
        for (key, value) in &self.options {
            long.insert(key.clone(), value.clone());
        }
        long
    }

    pub fn is_read_only(&self) -> bool {
        self.mode
            .as_deref()
            .is_some_and(|mode| mode.split(',').any(|flag| flag == "ro"))
    }
}

/// A `depends_on` edge with its long-syntax options (`condition`, `restart`, `required`).
#[derive(Debug, Clone, PartialEq)]
pub struct Dependency {
    pub service: String,
    pub options: Mapping,
}

impl Dependency {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            options: Mapping::new(),
        }
    }

    pub fn condition(&self) -> Option<&str> {
        self.options.get("condition").and_then(Value::as_str)
    }
}
