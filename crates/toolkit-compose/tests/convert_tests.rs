//! Integration tests for compose → AppStore conversion

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use serde_yaml::Value;
use std::fs;
use std::path::PathBuf;
use toolkit_compose::appstore::{FieldType, PANEL_NETWORK};
use toolkit_compose::path::{get_at_path, parse_path};
use toolkit_compose::{
    ComposeToAppStore, ConversionRequest, ConversionResult, ConvertError, ConvertOptions,
    Converter, convert, convert_str, parse_compose, restore_compose,
};

/// Path to the test-fixtures directory (relative to the workspace root).
fn fixtures_dir() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    // crates/toolkit-compose -> ../../test-fixtures
    manifest_dir.join("../../test-fixtures")
}

fn load_fixture(name: &str) -> String {
    let path = fixtures_dir().join("compose").join(name);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture at {}: {}", path.display(), e))
}

/// Assert that an error locator points at a node that exists in the source.
fn assert_locates_real_path(source: &str, err: &ConvertError) {
    let doc: Value = serde_yaml::from_str(source).unwrap();
    let locator = err.locator().expect("error should carry a locator");
    assert!(
        get_at_path(&doc, &parse_path(&locator)).is_some(),
        "locator `{locator}` does not exist in the source document"
    );
}

// ============================================================================
// Example scenarios
// ============================================================================

#[test]
fn test_single_web_service() {
    let source = load_fixture("single-web.yml");
    let conversion = convert_str(&source, &ConvertOptions::default()).unwrap();

    assert!(conversion.warnings.is_empty(), "{:?}", conversion.warnings);
    let package = &conversion.package;
    assert_eq!(package.key(), "web");
    assert_eq!(package.version, "latest");
    assert_eq!(package.compose.service_names(), vec!["web"]);

    let web = &package.compose.services[0];
    assert_eq!(web.image.as_deref(), Some("nginx:latest"));
    assert_eq!(web.ports.len(), 1);
    assert_eq!(web.ports[0].to_short(), "${PANEL_APP_PORT_HTTP}:80");
    assert_eq!(web.env("ENV").and_then(|v| v.value.as_deref()), Some("prod"));

    let field = package.form_field("PANEL_APP_PORT_HTTP").unwrap();
    assert_eq!(field.default, Value::from(80));
    assert_eq!(field.field_type, FieldType::Number);
    assert_eq!(field.rule.as_deref(), Some("paramPort"));
    assert_eq!(package.form_fields().len(), 1);
}

#[test]
fn test_network_mode_host_is_rejected() {
    let source = load_fixture("host-network.yml");
    let result = convert(&source, &ConvertOptions::default());

    let ConversionResult::Failure(err) = result else {
        panic!("host networking must not convert");
    };
    assert_eq!(err.kind(), "UnsupportedConstructError");
    assert_eq!(err.locator().as_deref(), Some("services.web.network_mode"));
    assert_locates_real_path(&source, &err);
}

#[test]
fn test_build_without_image_is_rejected() {
    let source = load_fixture("build-only.yml");
    let err = convert_str(&source, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedConstruct { .. }));
    assert_eq!(err.locator().as_deref(), Some("services.api.build"));
    assert_locates_real_path(&source, &err);
}

// ============================================================================
// Multi-service documents
// ============================================================================

#[test]
fn test_wordpress_stack() {
    let source = load_fixture("wordpress.yml");
    let conversion = convert_str(&source, &ConvertOptions::default()).unwrap();
    let package = &conversion.package;

    assert_eq!(package.key(), "wordpress-stack");
    assert_eq!(package.version, "6.5-apache");
    assert_eq!(package.compose.service_names(), vec!["db", "wordpress"]);
    assert_eq!(package.compose.dependency_edges(), vec![("wordpress", "db")]);

    let keys: Vec<_> = package
        .form_fields()
        .iter()
        .map(|f| f.env_key.as_str())
        .collect();
    assert_eq!(
        keys,
        vec!["DB_PASSWORD", "DB_ROOT_PASSWORD", "PANEL_APP_PORT_HTTP"]
    );
    assert_eq!(
        package.form_field("DB_PASSWORD").unwrap().field_type,
        FieldType::Password
    );
    assert_eq!(
        package.form_field("PANEL_APP_PORT_HTTP").unwrap().default,
        Value::from(8080)
    );

    let wordpress = package.compose.service("wordpress").unwrap();
    assert_eq!(wordpress.container_name.as_deref(), Some("${CONTAINER_NAME}"));
    assert_eq!(wordpress.restart.as_deref(), Some("always"));
    assert_eq!(wordpress.networks, vec![PANEL_NETWORK.to_string()]);
    assert_eq!(wordpress.depends_on[0].condition(), Some("service_healthy"));

    let db = package.compose.service("db").unwrap();
    assert_eq!(db.container_name.as_deref(), Some("${CONTAINER_NAME}-db"));
    assert_eq!(db.restart.as_deref(), Some("unless-stopped"));
    assert!(db.extra.iter().any(|(k, _)| k == "healthcheck"));

    let warned: Vec<_> = conversion.warnings.iter().map(|w| w.path.as_str()).collect();
    assert_eq!(
        warned,
        vec!["services.db.networks", "services.wordpress.networks", "networks"]
    );
}

#[test]
fn test_options_override_metadata() {
    let source = load_fixture("wordpress.yml");
    let metadata_path = fixtures_dir().join("metadata/wordpress.toml");
    let options: ConvertOptions =
        toml::from_str(&fs::read_to_string(metadata_path).unwrap()).unwrap();
    let conversion = convert_str(&source, &options).unwrap();

    let app = &conversion.package.app;
    assert_eq!(conversion.package.key(), "wordpress");
    assert_eq!(conversion.package.version, "6.5");
    assert_eq!(app.name, "WordPress");
    assert_eq!(app.description, "Open-source publishing platform");
    assert_eq!(app.additional_properties.short_desc_zh, "开源博客平台");
    assert_eq!(app.additional_properties.app_type, "website");
    assert_eq!(app.tags, vec!["Website".to_string()]);
}

// ============================================================================
// Structural properties
// ============================================================================

#[rstest]
#[case("single-web.yml")]
#[case("wordpress.yml")]
fn test_output_reparses_with_same_units(#[case] fixture: &str) {
    let source = load_fixture(fixture);
    let original = parse_compose(&source).unwrap();
    let conversion = convert_str(&source, &ConvertOptions::default()).unwrap();

    let compose_file = conversion
        .package
        .files()
        .unwrap()
        .into_iter()
        .find(|f| f.path.ends_with("docker-compose.yml"))
        .unwrap();
    let reparsed = parse_compose(&compose_file.contents).unwrap();

    assert_eq!(reparsed.service_names(), original.service_names());
    assert_eq!(reparsed.dependency_edges(), original.dependency_edges());
}

#[rstest]
#[case("single-web.yml")]
#[case("wordpress.yml")]
fn test_reverse_then_forward_adds_no_units(#[case] fixture: &str) {
    let source = load_fixture(fixture);
    let first = convert_str(&source, &ConvertOptions::default()).unwrap();
    let restored = restore_compose(&first.package);
    assert_eq!(restored.service_names(), first.package.compose.service_names());

    let restored_text = toolkit_compose::restore_compose_text(&first.package).unwrap();
    let second = convert_str(&restored_text, &ConvertOptions::default()).unwrap();
    assert_eq!(
        second.package.compose.service_names(),
        first.package.compose.service_names()
    );
    assert_eq!(
        second.package.compose.dependency_edges(),
        first.package.compose.dependency_edges()
    );
}

#[rstest]
#[case("single-web.yml")]
#[case("wordpress.yml")]
fn test_conversion_is_deterministic(#[case] fixture: &str) {
    let source = load_fixture(fixture);
    let options = ConvertOptions::default();
    let a = convert_str(&source, &options).unwrap();
    let b = convert_str(&source, &options).unwrap();
    assert_eq!(a.target_text, b.target_text);
    assert_eq!(a.warnings, b.warnings);
}

#[test]
fn test_target_text_lists_files_in_order() {
    let source = load_fixture("single-web.yml");
    let conversion = convert_str(&source, &ConvertOptions::default()).unwrap();
    let headers: Vec<_> = conversion
        .target_text
        .lines()
        .filter(|l| l.starts_with("# web/"))
        .collect();
    assert_eq!(
        headers,
        vec![
            "# web/data.yml",
            "# web/latest/data.yml",
            "# web/latest/docker-compose.yml",
            "# web/README.md",
        ]
    );
}

// ============================================================================
// Mapping rules
// ============================================================================

#[rstest]
#[case("none")]
#[case("service:db")]
#[case("container:abc")]
fn test_unsupported_network_modes(#[case] mode: &str) {
    let source = format!("services:\n  web:\n    image: nginx\n    network_mode: \"{mode}\"\n");
    let err = convert_str(&source, &ConvertOptions::default()).unwrap_err();
    assert_eq!(err.locator().as_deref(), Some("services.web.network_mode"));
}

#[test]
fn test_bridge_network_mode_is_dropped_with_warning() {
    let source = "services:\n  web:\n    image: nginx\n    network_mode: bridge\n";
    let conversion = convert_str(source, &ConvertOptions::default()).unwrap();
    assert_eq!(conversion.package.compose.services[0].network_mode, None);
    assert_eq!(conversion.warnings[0].path, "services.web.network_mode");
}

#[rstest]
#[case("services:\n  web:\n    image: nginx\n    secrets: [token]\n", "services.web.secrets")]
#[case("services:\n  web:\n    image: nginx\n    extends:\n      service: base\n", "services.web.extends")]
#[case("services:\n  web:\n    image: nginx\nconfigs:\n  app:\n    file: ./app.conf\n", "configs")]
fn test_unsupported_constructs(#[case] source: &str, #[case] locator: &str) {
    let err = convert_str(source, &ConvertOptions::default()).unwrap_err();
    assert_eq!(err.kind(), "UnsupportedConstructError");
    assert_eq!(err.locator().as_deref(), Some(locator));
    assert_locates_real_path(source, &err);
}

#[test]
fn test_unknown_dependency_is_validation_error() {
    let source = "services:\n  web:\n    image: nginx\n    depends_on: [cache]\n";
    let err = convert_str(source, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, ConvertError::Validation { .. }));
    assert_eq!(err.locator().as_deref(), Some("services.web.depends_on"));
}

#[test]
fn test_dependency_cycle_is_validation_error() {
    let source = "services:\n  a:\n    image: x\n    depends_on: [b]\n  b:\n    image: y\n    depends_on: [a]\n";
    let err = convert_str(source, &ConvertOptions::default()).unwrap_err();
    assert!(err.to_string().contains("a -> b -> a"), "{err}");
}

#[test]
fn test_parse_error_is_returned_as_value() {
    let result = ConversionRequest::new("services:\n  web:\n    image: [nginx\n").execute();
    let ConversionResult::Failure(err) = result else {
        panic!("malformed YAML must fail");
    };
    assert_eq!(err.kind(), "ParseError");
    assert!(err.locator().is_some());
}

#[test]
fn test_secondary_ports_get_service_keys() {
    let source = "services:\n  web:\n    image: nginx\n    ports: ['80:80', '443:443']\n  dns:\n    image: coredns\n    ports: ['53:53/udp', '53:53/tcp']\n";
    let conversion = convert_str(source, &ConvertOptions::default()).unwrap();
    let keys: Vec<_> = conversion
        .package
        .form_fields()
        .iter()
        .map(|f| f.env_key.as_str())
        .collect();
    assert_eq!(
        keys,
        vec![
            "PANEL_APP_PORT_HTTP",
            "PANEL_APP_PORT_WEB_443",
            "PANEL_APP_PORT_DNS_53_UDP",
            "PANEL_APP_PORT_DNS_53",
        ]
    );
}

#[test]
fn test_duplicate_generated_port_key_is_validation_error() {
    let source = "services:\n  web:\n    image: nginx\n    ports: ['80:80', '8080:80', '8081:80']\n";
    let err = convert_str(source, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, ConvertError::Validation { .. }));
    assert_eq!(err.locator().as_deref(), Some("services.web.ports[2]"));
}

#[test]
fn test_variable_port_is_kept_and_exposed() {
    let source = "services:\n  web:\n    image: nginx\n    ports: ['${WEB_PORT:-8080}:80']\n";
    let conversion = convert_str(source, &ConvertOptions::default()).unwrap();
    let web = &conversion.package.compose.services[0];
    assert_eq!(web.ports[0].to_short(), "${WEB_PORT:-8080}:80");
    let field = conversion.package.form_field("WEB_PORT").unwrap();
    assert_eq!(field.default, Value::from(8080));
    assert!(conversion.package.form_field("PANEL_APP_PORT_HTTP").is_none());
}

#[test]
fn test_env_without_value_becomes_parameter() {
    let source = "services:\n  web:\n    image: nginx\n    environment:\n      - API_TOKEN\n";
    let conversion = convert_str(source, &ConvertOptions::default()).unwrap();
    let web = &conversion.package.compose.services[0];
    assert_eq!(
        web.env("API_TOKEN").and_then(|v| v.value.as_deref()),
        Some("${API_TOKEN}")
    );
    let field = conversion.package.form_field("API_TOKEN").unwrap();
    assert_eq!(field.field_type, FieldType::Password);
    assert_eq!(field.default_string(), "");
}

#[test]
fn test_conflicting_defaults_warn_and_keep_first() {
    let source = "services:\n  web:\n    image: nginx\n    environment:\n      A: ${MODE:-dev}\n      B: ${MODE:-prod}\n";
    let conversion = convert_str(source, &ConvertOptions::default()).unwrap();
    assert_eq!(
        conversion.package.form_field("MODE").unwrap().default_string(),
        "dev"
    );
    assert_eq!(conversion.warnings.len(), 1);
    assert_eq!(conversion.warnings[0].path, "services.web.environment.B");
}

#[test]
fn test_lossy_attributes_warn() {
    let source = "version: '3.8'\nx-common: &common {}\nservices:\n  web:\n    image: nginx\n    build: .\n    env_file: .env\n    profiles: [debug]\n    ports: ['8000-8010:8000-8010']\n    volumes: ['/srv/web:/usr/share/nginx/html']\n    frobnicate: true\n";
    let conversion = convert_str(source, &ConvertOptions::default()).unwrap();
    let warned: Vec<_> = conversion.warnings.iter().map(|w| w.path.as_str()).collect();
    assert_eq!(
        warned,
        vec![
            "x-common",
            "services.web.build",
            "services.web.ports[0]",
            "services.web.env_file",
            "services.web.volumes[0]",
            "services.web.profiles",
            "services.web.frobnicate",
        ]
    );
    let web = &conversion.package.compose.services[0];
    assert!(web.build.is_none());
    assert!(web.env_file.is_empty());
    assert!(web.extra.iter().any(|(k, _)| k == "frobnicate"));
    assert!(!web.extra.iter().any(|(k, _)| k == "profiles"));
}

#[test]
fn test_labels_get_created_by() {
    let source = "services:\n  web:\n    image: nginx\n    labels:\n      - traefik.enable=true\n";
    let conversion = convert_str(source, &ConvertOptions::default()).unwrap();
    let web = &conversion.package.compose.services[0];
    assert_eq!(web.label("traefik.enable"), Some("true"));
    assert_eq!(web.label("createdBy"), Some("Apps"));
}

#[test]
fn test_converter_trait_object() {
    let converter: Box<dyn Converter> = Box::new(ComposeToAppStore::new(
        ConvertOptions::new().with_key("demo").with_version("1.0"),
    ));
    assert_eq!(converter.source_format(), "docker-compose");
    assert_eq!(converter.target_format(), "1panel-appstore");
    let result = converter.convert(&load_fixture("single-web.yml"));
    assert!(result.target_text().unwrap().contains("# demo/1.0/docker-compose.yml"));
}

// ============================================================================
// Volumes
// ============================================================================

fn rendered_compose(conversion: &toolkit_compose::Conversion) -> String {
    conversion
        .package
        .files()
        .unwrap()
        .into_iter()
        .find(|f| f.path.ends_with("docker-compose.yml"))
        .unwrap()
        .contents
}

#[rstest]
#[case::tmpfs_size(
    "{type: tmpfs, target: /cache, tmpfs: {size: 100000000}}",
    "{type: tmpfs, target: /cache, tmpfs: {size: 100000000}}"
)]
#[case::tmpfs_read_only(
    "{type: tmpfs, target: /t, read_only: true}",
    "{type: tmpfs, target: /t, read_only: true}"
)]
#[case::volume_nocopy(
    "{type: volume, source: data, target: /d, volume: {nocopy: true}}",
    "{type: volume, source: data, target: /d, volume: {nocopy: true}}"
)]
#[case::bind_without_prefix(
    "{type: bind, source: data, target: /d}",
    "{type: bind, source: data, target: /d}"
)]
#[case::bind_propagation(
    "{type: bind, source: ./conf, target: /etc/app, bind: {propagation: rshared, create_host_path: true}, consistency: cached}",
    "{type: bind, source: ./conf, target: /etc/app, bind: {propagation: rshared, create_host_path: true}, consistency: cached}"
)]
#[case::plain_bind("{type: bind, source: ./conf, target: /etc/app, read_only: true}", "./conf:/etc/app:ro")]
fn test_long_volume_syntax_survives(#[case] entry: &str, #[case] expected: &str) {
    let source = format!("services:\n  web:\n    image: nginx\n    volumes:\n      - {entry}\n");
    let conversion = convert_str(&source, &ConvertOptions::default()).unwrap();
    assert!(conversion.warnings.is_empty(), "{:?}", conversion.warnings);

    let output = rendered_compose(&conversion);
    let doc: Value = serde_yaml::from_str(&output).unwrap();
    let expected: Value = serde_yaml::from_str(expected).unwrap();
    assert_eq!(doc["services"]["web"]["volumes"][0], expected);

    let original = parse_compose(&source).unwrap();
    let reparsed = parse_compose(&output).unwrap();
    assert_eq!(
        reparsed.services[0].volumes[0],
        original.services[0].volumes[0]
    );
}

#[test]
fn test_external_volume_warning_names_only_external_volumes() {
    let source = "services:\n  web:\n    image: nginx\n    volumes: ['data:/d', 'shared:/s']\nvolumes:\n  data: {}\n  shared:\n    external: true\n";
    let conversion = convert_str(source, &ConvertOptions::default()).unwrap();
    assert_eq!(conversion.warnings.len(), 1);
    let warning = &conversion.warnings[0];
    assert_eq!(warning.path, "volumes");
    assert!(warning.message.contains("(shared)"), "{}", warning.message);
    assert!(!warning.message.contains("data"), "{}", warning.message);
}

// ============================================================================
// Locators
// ============================================================================

#[test]
fn test_dotted_service_name_locator_resolves() {
    let source = "services:\n  web.app:\n    image: nginx\n    network_mode: host\n";
    let err = convert_str(source, &ConvertOptions::default()).unwrap_err();
    assert_eq!(
        err.locator().as_deref(),
        Some(r#"services["web.app"].network_mode"#)
    );
    assert_locates_real_path(source, &err);
}

#[test]
fn test_list_environment_warning_points_at_entry() {
    let source = "services:\n  web:\n    image: nginx\n    environment:\n      - A=${MODE:-dev}\n      - B=${MODE:-prod}\n";
    let conversion = convert_str(source, &ConvertOptions::default()).unwrap();
    assert_eq!(conversion.warnings.len(), 1);
    let path = &conversion.warnings[0].path;
    assert_eq!(path, "services.web.environment[1]");

    let doc: Value = serde_yaml::from_str(source).unwrap();
    assert_eq!(
        get_at_path(&doc, &parse_path(path)).and_then(Value::as_str),
        Some("B=${MODE:-prod}")
    );
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    #[test]
    fn prop_generated_stack_converts_deterministically(
        names in proptest::collection::btree_set("s[a-z0-9]{0,6}", 1..5),
        port in 1024u16..65000,
    ) {
        let names: Vec<_> = names.into_iter().collect();
        let mut source = String::from("services:\n");
        for (i, name) in names.iter().enumerate() {
            source.push_str(&format!("  {name}:\n    image: app/{name}:1.0\n"));
            source.push_str(&format!("    ports:\n      - \"{}:80\"\n", port as usize + i));
            if i > 0 {
                source.push_str(&format!("    depends_on: [{}]\n", names[i - 1]));
            }
        }

        let a = convert_str(&source, &ConvertOptions::default()).unwrap();
        let b = convert_str(&source, &ConvertOptions::default()).unwrap();
        prop_assert_eq!(&a.target_text, &b.target_text);
        prop_assert_eq!(a.package.compose.service_names(), names.iter().map(String::as_str).collect::<Vec<_>>());
        prop_assert_eq!(a.package.form_fields().len(), names.len());
        prop_assert!(a.warnings.is_empty());
    }
}
