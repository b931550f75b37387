//! Compose → 1Panel AppStore conversion
//!
//! Conversion is a pure function of the source text and the options: no
//! I/O, no clock, no randomness. Every source service becomes exactly one
//! target service, dependency edges are kept, and anything that cannot be
//! represented is either rejected with a [`ConvertError`] or reported as a
//! [`ConversionWarning`] next to the output.

use std::collections::{HashMap, HashSet};

use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

use crate::appstore::{
    AppDefinition, AppProperties, AppStorePackage, CONTAINER_NAME_KEY, CREATED_BY_LABEL,
    CREATED_BY_VALUE, FormField, FormFields, PANEL_NETWORK, VersionDefinition,
    render_package_text,
};
use crate::compose::{ComposeFile, PortMapping, Service, parse_compose};
use crate::error::{ConversionWarning, ConvertError, Result};
use crate::options::ConvertOptions;
use crate::path::DocPath;
use crate::vars;

/// Env key of the primary published port.
pub const HTTP_PORT_KEY: &str = "PANEL_APP_PORT_HTTP";
const PORT_KEY_PREFIX: &str = "PANEL_APP_PORT_";

/// Service attributes copied to the target unchanged.
const PASSTHROUGH_KEYS: &[&str] = &[
    "cap_add",
    "cap_drop",
    "command",
    "cpus",
    "deploy",
    "devices",
    "dns",
    "entrypoint",
    "expose",
    "extra_hosts",
    "healthcheck",
    "hostname",
    "init",
    "ipc",
    "logging",
    "mem_limit",
    "pid",
    "privileged",
    "security_opt",
    "shm_size",
    "stdin_open",
    "stop_grace_period",
    "stop_signal",
    "sysctls",
    "tmpfs",
    "tty",
    "ulimits",
    "user",
    "working_dir",
];

/// A successful conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub package: AppStorePackage,
    /// The whole package rendered as one text
    pub target_text: String,
    pub warnings: Vec<ConversionWarning>,
}

/// Outcome of a conversion, returned as a value to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionResult {
    Success(Conversion),
    Failure(ConvertError),
}

impl ConversionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn target_text(&self) -> Option<&str> {
        match self {
            Self::Success(conversion) => Some(&conversion.target_text),
            Self::Failure(_) => None,
        }
    }

    pub fn warnings(&self) -> &[ConversionWarning] {
        match self {
            Self::Success(conversion) => &conversion.warnings,
            Self::Failure(_) => &[],
        }
    }

    pub fn into_result(self) -> Result<Conversion> {
        match self {
            Self::Success(conversion) => Ok(conversion),
            Self::Failure(err) => Err(err),
        }
    }
}

impl From<Result<Conversion>> for ConversionResult {
    fn from(result: Result<Conversion>) -> Self {
        match result {
            Ok(conversion) => Self::Success(conversion),
            Err(err) => Self::Failure(err),
        }
    }
}

/// A single conversion request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionRequest {
    pub source_text: String,
    pub options: ConvertOptions,
}

impl ConversionRequest {
    pub fn new(source_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            options: ConvertOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    pub fn execute(&self) -> ConversionResult {
        convert(&self.source_text, &self.options)
    }
}

/// Text-to-text conversion between two declarative schemas.
pub trait Converter: Send + Sync {
    /// Name of the accepted input format
    fn source_format(&self) -> &'static str;

    /// Name of the produced output format
    fn target_format(&self) -> &'static str;

    fn convert(&self, source: &str) -> ConversionResult;
}

/// The Docker Compose → 1Panel AppStore converter.
#[derive(Debug, Clone, Default)]
pub struct ComposeToAppStore {
    options: ConvertOptions,
}

impl ComposeToAppStore {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }
}

impl Converter for ComposeToAppStore {
    fn source_format(&self) -> &'static str {
        "docker-compose"
    }

    fn target_format(&self) -> &'static str {
        "1panel-appstore"
    }

    fn convert(&self, source: &str) -> ConversionResult {
        convert(source, &self.options)
    }
}

/// Convert compose text, returning the outcome as a value.
pub fn convert(source: &str, options: &ConvertOptions) -> ConversionResult {
    convert_str(source, options).into()
}

/// Convert compose text.
pub fn convert_str(source: &str, options: &ConvertOptions) -> Result<Conversion> {
    let compose = parse_compose(source)?;
    let (package, warnings) = convert_compose(&compose, options)?;
    let target_text = render_package_text(&package)?;

    for warning in &warnings {
        warn!(path = %warning.path, "{}", warning.message);
    }
    debug!(
        key = package.key(),
        version = %package.version,
        fields = package.form_fields().len(),
        warnings = warnings.len(),
        "Converted compose document"
    );

    Ok(Conversion {
        package,
        target_text,
        warnings,
    })
}

/// Map a parsed compose document to an AppStore package.
pub fn convert_compose(
    compose: &ComposeFile,
    options: &ConvertOptions,
) -> Result<(AppStorePackage, Vec<ConversionWarning>)> {
    check_top_level(compose)?;
    check_dependencies(compose)?;
    let primary = primary_service(compose, options)?;
    Mapper::new(compose, options, primary).run()
}

fn check_top_level(compose: &ComposeFile) -> Result<()> {
    for (key, _) in &compose.extra {
        let path = DocPath::root().key(key);
        match key.as_str() {
            "secrets" | "configs" => {
                return Err(ConvertError::unsupported(
                    path,
                    "secrets and configs reference files outside the app package",
                ));
            }
            "include" => {
                return Err(ConvertError::unsupported(
                    path,
                    "included compose files must be merged before conversion",
                ));
            }
            _ => {}
        }
    }
    Ok(())
}

fn check_dependencies(compose: &ComposeFile) -> Result<()> {
    for service in &compose.services {
        let path = DocPath::root()
            .key("services")
            .key(&service.name)
            .key("depends_on");
        for dep in &service.depends_on {
            if compose.service(&dep.service).is_none() {
                return Err(ConvertError::validation(
                    path,
                    format!("depends on unknown service `{}`", dep.service),
                ));
            }
        }
    }

    if let Some(cycle) = find_cycle(compose) {
        let path = DocPath::root()
            .key("services")
            .key(cycle[0])
            .key("depends_on");
        return Err(ConvertError::validation(
            path,
            format!("dependency cycle: {}", cycle.join(" -> ")),
        ));
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

fn find_cycle(compose: &ComposeFile) -> Option<Vec<&str>> {
    fn visit<'a>(
        compose: &'a ComposeFile,
        name: &'a str,
        marks: &mut HashMap<&'a str, Mark>,
        stack: &mut Vec<&'a str>,
    ) -> Option<Vec<&'a str>> {
        match marks.get(name) {
            Some(Mark::Done) => return None,
            Some(Mark::Visiting) => {
                let start = stack.iter().position(|s| *s == name)?;
                let mut cycle = stack[start..].to_vec();
                cycle.push(name);
                return Some(cycle);
            }
            None => {}
        }

        marks.insert(name, Mark::Visiting);
        stack.push(name);
        if let Some(service) = compose.service(name) {
            for dep in &service.depends_on {
                if let Some(cycle) = visit(compose, &dep.service, marks, stack) {
                    return Some(cycle);
                }
            }
        }
        stack.pop();
        marks.insert(name, Mark::Done);
        None
    }

    let mut marks = HashMap::new();
    let mut stack = Vec::new();
    compose
        .services
        .iter()
        .find_map(|s| visit(compose, &s.name, &mut marks, &mut stack))
}

/// The configured primary service, else the first service nothing depends on.
fn primary_service<'a>(compose: &'a ComposeFile, options: &ConvertOptions) -> Result<&'a str> {
    if let Some(name) = &options.primary_service {
        return compose
            .service(name)
            .map(|s| s.name.as_str())
            .ok_or_else(|| {
                ConvertError::validation("services", format!("primary service `{name}` not found"))
            });
    }

    let primary = compose
        .services
        .iter()
        .find(|candidate| {
            !compose
                .services
                .iter()
                .any(|s| s.depends_on_service(&candidate.name))
        })
        .or_else(|| compose.services.first())
        .map(|s| s.name.as_str())
        .ok_or_else(|| ConvertError::parse("`services` must declare at least one service"))?;
    Ok(primary)
}

struct Mapper<'a> {
    source: &'a ComposeFile,
    options: &'a ConvertOptions,
    primary: &'a str,
    fields: Vec<FormField>,
    field_index: HashMap<String, usize>,
    port_keys: HashSet<String>,
    http_assigned: bool,
    warnings: Vec<ConversionWarning>,
}

impl<'a> Mapper<'a> {
    fn new(source: &'a ComposeFile, options: &'a ConvertOptions, primary: &'a str) -> Self {
        Self {
            source,
            options,
            primary,
            fields: Vec::new(),
            field_index: HashMap::new(),
            port_keys: HashSet::new(),
            http_assigned: false,
            warnings: Vec::new(),
        }
    }

    fn run(mut self) -> Result<(AppStorePackage, Vec<ConversionWarning>)> {
        let source = self.source;
        let key = self.app_key()?;
        let name = self.options.name.clone().unwrap_or_else(|| key.clone());
        let version = self.app_version();
        debug!(%key, %version, primary = self.primary, "Mapping compose document");

        for (extra_key, _) in &source.extra {
            let path = DocPath::root().key(extra_key);
            if extra_key == "version" {
                continue;
            }
            if extra_key.starts_with("x-") {
                self.warn(path, "extension field dropped");
            } else {
                self.warn(path, "unrecognized top-level attribute dropped");
            }
        }

        let mut target = ComposeFile::default();
        for service in &source.services {
            let path = DocPath::root().key("services").key(&service.name);
            let mapped = self.map_service(service, &path)?;
            target.services.push(mapped);
        }

        target.volumes = source.volumes.clone();
        let external: Vec<_> = source
            .volumes
            .iter()
            .filter(|(_, spec)| {
                spec.as_mapping()
                    .and_then(|spec| spec.get("external"))
                    .and_then(Value::as_bool)
                    == Some(true)
            })
            .filter_map(|(name, _)| name.as_str())
            .collect();
        if !external.is_empty() {
            self.warn(
                DocPath::root().key("volumes"),
                format!(
                    "external volumes must exist on the 1Panel host ({})",
                    external.join(", ")
                ),
            );
        }
        target.networks = self.map_networks();

        let app = self.app_definition(&key, &name);
        let package = AppStorePackage {
            app,
            version,
            form: VersionDefinition {
                additional_properties: FormFields {
                    form_fields: self.fields,
                },
            },
            compose: target,
        };
        Ok((package, self.warnings))
    }

    fn map_service(&mut self, service: &Service, path: &DocPath) -> Result<Service> {
        let is_primary = service.name == self.primary;
        let mut out = Service::new(&service.name);

        match (&service.image, &service.build) {
            (Some(image), build) => {
                self.collect_refs(image, &path.key("image"));
                out.image = Some(image.clone());
                if build.is_some() {
                    self.warn(
                        path.key("build"),
                        "build section dropped; the published image is deployed",
                    );
                }
            }
            (None, Some(_)) => {
                return Err(ConvertError::unsupported(
                    path.key("build"),
                    "services built from source need a published `image`",
                ));
            }
            (None, None) => {
                return Err(ConvertError::validation(
                    path.key("image"),
                    "service declares no image",
                ));
            }
        }

        out.container_name = Some(if is_primary {
            format!("${{{CONTAINER_NAME_KEY}}}")
        } else {
            format!("${{{CONTAINER_NAME_KEY}}}-{}", service.name)
        });
        out.restart = Some(service.restart.clone().unwrap_or_else(|| "always".to_string()));
        out.depends_on = service.depends_on.clone();

        if let Some(mode) = &service.network_mode {
            match mode.as_str() {
                "bridge" | "default" => self.warn(
                    path.key("network_mode"),
                    format!("network mode `{mode}` replaced by {PANEL_NETWORK}"),
                ),
                _ => {
                    return Err(ConvertError::unsupported(
                        path.key("network_mode"),
                        format!("unsupported network mode `{mode}`; 1Panel apps must join {PANEL_NETWORK}"),
                    ));
                }
            }
        }

        let custom: Vec<&str> = service
            .networks
            .iter()
            .map(String::as_str)
            .filter(|n| *n != "default" && *n != PANEL_NETWORK)
            .collect();
        if !custom.is_empty() {
            self.warn(
                path.key("networks"),
                format!("networks {} replaced by {PANEL_NETWORK}", custom.join(", ")),
            );
        }
        out.networks = vec![PANEL_NETWORK.to_string()];

        for (i, port) in service.ports.iter().enumerate() {
            let mapped = self.map_port(service, is_primary, port, &path.key("ports").index(i))?;
            out.ports.push(mapped);
        }

        if !service.env_file.is_empty() {
            self.warn(
                path.key("env_file"),
                format!(
                    "env files are not shipped with the app ({}); declare the variables under `environment`",
                    service.env_file.join(", ")
                ),
            );
        }
        for (i, var) in service.environment.iter().enumerate() {
            let var_path = if service.environment_is_list {
                path.key("environment").index(i)
            } else {
                path.key("environment").key(&var.name)
            };
            let mut mapped = var.clone();
            match &var.value {
                Some(value) => self.collect_refs(value, &var_path),
                None => {
                    self.add_field(FormField::variable(&var.name, None), &var_path);
                    mapped.value = Some(format!("${{{}}}", var.name));
                }
            }
            out.environment.push(mapped);
        }

        for (i, volume) in service.volumes.iter().enumerate() {
            let volume_path = path.key("volumes").index(i);
            if let Some(source) = &volume.source {
                self.collect_refs(source, &volume_path);
            }
            for (key, value) in &volume.options {
                if let Some(key) = key.as_str() {
                    self.collect_value_refs(value, &volume_path.key(key));
                }
            }
            if volume.is_absolute_bind() {
                self.warn(
                    volume_path,
                    "absolute host path kept; 1Panel apps usually mount under ./data",
                );
            }
            out.volumes.push(volume.clone());
        }

        out.labels = service.labels.clone();
        match out.labels.iter_mut().find(|(k, _)| k == CREATED_BY_LABEL) {
            Some((_, value)) => *value = CREATED_BY_VALUE.to_string(),
            None => out
                .labels
                .push((CREATED_BY_LABEL.to_string(), CREATED_BY_VALUE.to_string())),
        }

        for (key, value) in &service.extra {
            let attr_path = path.key(key);
            match key.as_str() {
                "secrets" | "configs" => {
                    return Err(ConvertError::unsupported(
                        attr_path,
                        "secrets and configs reference files outside the app package",
                    ));
                }
                "extends" => {
                    return Err(ConvertError::unsupported(
                        attr_path,
                        "`extends` must be flattened before conversion",
                    ));
                }
                "profiles" => {
                    self.warn(attr_path, "profiles dropped; the service is always deployed");
                }
                k if k.starts_with("x-") => self.warn(attr_path, "extension field dropped"),
                k => {
                    if !PASSTHROUGH_KEYS.contains(&k) {
                        self.warn(attr_path.clone(), "unrecognized attribute passed through unchanged");
                    }
                    self.collect_value_refs(value, &attr_path);
                    out.extra.push((key.clone(), value.clone()));
                }
            }
        }

        Ok(out)
    }

    fn map_port(
        &mut self,
        service: &Service,
        is_primary: bool,
        port: &PortMapping,
        path: &DocPath,
    ) -> Result<PortMapping> {
        let mut mapped = port.clone();
        for attr in std::mem::take(&mut mapped.dropped) {
            self.warn(
                path.key(&attr),
                format!("port attribute `{attr}` has no short-syntax equivalent and was dropped"),
            );
        }
        if port.host_ip.is_some() {
            self.warn(path.clone(), "host IP binding kept as-is");
        }
        if port.is_range() {
            self.warn(path.clone(), "port ranges cannot be parameterized and are kept as-is");
            return Ok(mapped);
        }

        let Some(published) = port.published.as_deref() else {
            return Ok(mapped);
        };

        if let Some(var) = vars::parse_ref(published) {
            let default = var
                .default
                .as_deref()
                .map_or_else(|| Value::String(String::new()), port_default);
            let field = FormField::port(
                &var.name,
                format!("{} port {}", service.name, port.target),
                format!("{} 端口 {}", service.name, port.target),
                default,
            );
            self.add_field(field, path);
            return Ok(mapped);
        }
        if vars::has_refs(published) {
            self.collect_refs(published, path);
            return Ok(mapped);
        }

        let (key, label_en, label_zh) = if is_primary && !self.http_assigned {
            self.http_assigned = true;
            (HTTP_PORT_KEY.to_string(), "Port".to_string(), "端口".to_string())
        } else {
            let mut key = format!(
                "{PORT_KEY_PREFIX}{}_{}",
                env_segment(&service.name),
                env_segment(&port.target)
            );
            if let Some(protocol) = port.protocol.as_deref().filter(|p| *p != "tcp") {
                key.push('_');
                key.push_str(&env_segment(protocol));
            }
            (
                key,
                format!("{} port {}", service.name, port.target),
                format!("{} 端口 {}", service.name, port.target),
            )
        };

        if !self.port_keys.insert(key.clone()) {
            return Err(ConvertError::validation(
                path,
                format!("generated port parameter `{key}` is not unique"),
            ));
        }
        self.add_field(
            FormField::port(&key, label_en, label_zh, port_default(published)),
            path,
        );
        mapped.published = Some(format!("${{{key}}}"));
        Ok(mapped)
    }

    fn map_networks(&mut self) -> Mapping {
        let source = self.source;
        let custom: Vec<&str> = source
            .networks
            .keys()
            .filter_map(Value::as_str)
            .filter(|n| *n != "default" && *n != PANEL_NETWORK)
            .collect();
        if !custom.is_empty() {
            let message = format!("networks {} replaced by {PANEL_NETWORK}", custom.join(", "));
            self.warn(DocPath::root().key("networks"), message);
        }

        let mut external = Mapping::new();
        external.insert("external".into(), Value::Bool(true));
        let mut networks = Mapping::new();
        networks.insert(PANEL_NETWORK.into(), Value::Mapping(external));
        networks
    }

    fn app_key(&self) -> Result<String> {
        let raw = self
            .options
            .key
            .as_deref()
            .or(self.source.name.as_deref())
            .unwrap_or(self.primary);
        let key = normalize_key(raw);
        if key.is_empty() {
            return Err(ConvertError::validation(
                "name",
                format!("`{raw}` does not yield a usable app key"),
            ));
        }
        Ok(key)
    }

    fn app_version(&self) -> String {
        let version = match &self.options.version {
            Some(version) => version.clone(),
            None => self
                .source
                .service(self.primary)
                .and_then(|s| s.image.as_deref())
                .and_then(image_tag)
                .unwrap_or_else(|| "latest".to_string()),
        };
        let version = normalize_version(&version);
        if version.is_empty() {
            "latest".to_string()
        } else {
            version
        }
    }

    fn app_definition(&self, key: &str, name: &str) -> AppDefinition {
        let meta = &self.options.metadata;
        let description = meta
            .description
            .clone()
            .unwrap_or_else(|| format!("{name} converted from Docker Compose"));
        AppDefinition {
            name: name.to_string(),
            tags: meta.tags.clone(),
            title: meta.title.clone().unwrap_or_else(|| description.clone()),
            description: description.clone(),
            additional_properties: AppProperties {
                key: key.to_string(),
                name: name.to_string(),
                tags: meta.tags.clone(),
                short_desc_zh: meta
                    .short_desc_zh
                    .clone()
                    .unwrap_or_else(|| description.clone()),
                short_desc_en: meta.short_desc_en.clone().unwrap_or(description),
                app_type: meta.app_type.clone(),
                cross_version_update: meta.cross_version_update,
                limit: meta.limit,
                recommend: meta.recommend,
                website: meta.website.clone(),
                github: meta.github.clone(),
                document: meta.document.clone(),
            },
        }
    }

    /// Register variables referenced in a string as form fields.
    fn collect_refs(&mut self, s: &str, path: &DocPath) {
        for var in vars::find_refs(s) {
            if var.name == CONTAINER_NAME_KEY {
                continue;
            }
            self.add_field(FormField::variable(&var.name, var.default.as_deref()), path);
        }
    }

    fn collect_value_refs(&mut self, value: &Value, path: &DocPath) {
        match value {
            Value::String(s) => self.collect_refs(s, path),
            Value::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.collect_value_refs(item, &path.index(i));
                }
            }
            Value::Mapping(map) => {
                for (k, v) in map {
                    let child = match k.as_str() {
                        Some(k) => path.key(k),
                        None => path.clone(),
                    };
                    self.collect_value_refs(v, &child);
                }
            }
            _ => {}
        }
    }

    /// First declaration of an env key wins.
    fn add_field(&mut self, field: FormField, path: &DocPath) {
        if let Some(&idx) = self.field_index.get(&field.env_key) {
            let existing = &self.fields[idx];
            if existing.default != field.default {
                let message = format!(
                    "parameter `{}` declared again with a different default; keeping `{}`",
                    field.env_key,
                    existing.default_string()
                );
                self.warn(path.clone(), message);
            }
            return;
        }
        self.field_index
            .insert(field.env_key.clone(), self.fields.len());
        self.fields.push(field);
    }

    fn warn(&mut self, path: DocPath, message: impl Into<String>) {
        self.warnings.push(ConversionWarning::new(path, message));
    }
}

fn port_default(published: &str) -> Value {
    match published.parse::<u16>() {
        Ok(port) => Value::from(port),
        Err(_) => Value::String(published.to_string()),
    }
}

/// Uppercase an identifier for use inside an env key.
fn env_segment(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Lowercase `[a-z0-9-]` with single dashes.
pub fn normalize_key(raw: &str) -> String {
    collapse_dashes(raw.chars().map(|c| {
        if c.is_ascii_alphanumeric() {
            c.to_ascii_lowercase()
        } else {
            '-'
        }
    }))
}

fn normalize_version(raw: &str) -> String {
    collapse_dashes(raw.chars().map(|c| {
        if c.is_ascii_alphanumeric() || c == '.' || c == '_' {
            c
        } else {
            '-'
        }
    }))
}

fn collapse_dashes(chars: impl Iterator<Item = char>) -> String {
    let mut out = String::new();
    for c in chars {
        if c == '-' && (out.is_empty() || out.ends_with('-')) {
            continue;
        }
        out.push(c);
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Tag of an image reference, with variable defaults applied.
///
/// Returns `None` for untagged images, digests and unresolved variables.
pub fn image_tag(image: &str) -> Option<String> {
    let image = vars::substitute(image, |_| None);
    if vars::has_refs(&image) {
        return None;
    }
    let without_digest = image.split('@').next().unwrap_or_default();
    let last = without_digest.rsplit('/').next().unwrap_or_default();
    last.split_once(':')
        .map(|(_, tag)| tag.to_string())
        .filter(|tag| !tag.is_empty())
}
