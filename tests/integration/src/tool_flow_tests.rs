//! End-to-end flow: registry lookup → lazy component → converter.
//!
//! Each test starts from the public surface a shell would use.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use std::sync::Arc;
use toolkit_compose::path::{get_at_path, parse_path};
use toolkit_compose::{ConversionResult, ConvertOptions, convert, parse_compose, restore_compose_text};
use toolkit_registry::{
    Error, LazyComponent, ToolComponent, ToolDescriptor, ToolOutcome, ToolRegistry,
    builtin_descriptors,
};

const COMPOSE_TOOL: &str = "/docker-compose-to-1panel-appstore";

fn run_compose_tool(input: &str) -> ToolOutcome {
    let registry = ToolRegistry::with_builtins().unwrap();
    registry
        .lookup(COMPOSE_TOOL)
        .unwrap()
        .component
        .load()
        .run(input)
}

/// The compose file embedded in the rendered package text.
fn compose_section(target_text: &str) -> String {
    target_text
        .split("---\n# ")
        .find(|section| section.contains("/docker-compose.yml\n"))
        .and_then(|section| section.split_once('\n'))
        .map(|(_, body)| body.to_string())
        .expect("package text has a compose section")
}

// ============================================================================
// Example scenarios through the registry
// ============================================================================

#[test]
fn test_single_service_scenario() {
    let source = "services:\n  web:\n    image: nginx:latest\n    ports:\n      - \"80:80\"\n    environment:\n      - ENV=prod\n";

    let ToolOutcome::Success { output, warnings } = run_compose_tool(source) else {
        panic!("conversion should succeed");
    };
    assert!(warnings.is_empty(), "{warnings:?}");

    let compose = parse_compose(&compose_section(&output)).unwrap();
    assert_eq!(compose.service_names(), vec!["web"]);
    let web = &compose.services[0];
    assert_eq!(web.image.as_deref(), Some("nginx:latest"));
    assert_eq!(web.ports[0].target, "80");
    assert_eq!(web.env("ENV").and_then(|v| v.value.as_deref()), Some("prod"));
}

#[test]
fn test_unsupported_network_mode_scenario() {
    let source = "services:\n  web:\n    image: nginx:latest\n    network_mode: host\n";

    let ToolOutcome::Failure { locator, message } = run_compose_tool(source) else {
        panic!("host networking must fail");
    };
    let locator = locator.unwrap();
    assert_eq!(locator, "services.web.network_mode");
    assert!(message.contains("network mode"));

    let doc: serde_yaml::Value = serde_yaml::from_str(source).unwrap();
    assert_eq!(
        get_at_path(&doc, &parse_path(&locator)).and_then(|v| v.as_str()),
        Some("host")
    );

    let result = convert(source, &ConvertOptions::default());
    assert!(result.target_text().is_none());
    assert!(matches!(result, ConversionResult::Failure(_)));
}

// ============================================================================
// Registry invariants
// ============================================================================

struct Constant(&'static str);

impl ToolComponent for Constant {
    fn run(&self, _input: &str) -> ToolOutcome {
        ToolOutcome::success(self.0)
    }
}

fn constant_tool(path: &str) -> ToolDescriptor {
    ToolDescriptor::new(
        path,
        format!("Tool {path}"),
        chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        LazyComponent::new(|| Arc::new(Constant("ok"))),
    )
}

#[test]
fn test_list_all_counts_successful_registrations() {
    let mut builder = ToolRegistry::builder();
    let attempts = [
        "/a", "/b", "a", "/c d", "/c", "/b", "",
    ];
    let successes = attempts
        .iter()
        .filter(|path| builder.register(constant_tool(path)).is_ok())
        .count();
    let registry = builder.build();

    assert_eq!(successes, 3);
    assert_eq!(registry.list_all().len(), successes);
}

#[rstest]
#[case("/docker-compose-to-1panel-appstore")]
#[case("docker-compose-to-1panel-appstore")]
fn test_duplicate_builtin_path_rejected(#[case] path: &str) {
    let mut builder = ToolRegistry::builder();
    builder.register_all(builtin_descriptors()).unwrap();
    assert_eq!(
        builder.register(constant_tool(path)).unwrap_err(),
        Error::DuplicateRoute {
            path: COMPOSE_TOOL.into()
        }
    );
}

// ============================================================================
// Conversion properties on realistic stacks
// ============================================================================

const STACK: &str = r#"
name: gitea
services:
  server:
    image: gitea/gitea:1.22
    environment:
      - USER_UID=1000
      - GITEA__database__PASSWD=${DB_PASSWORD:-gitea}
    volumes:
      - ./data:/data
    ports:
      - "3000:3000"
      - "222:22"
    depends_on:
      - db
  db:
    image: postgres:16
    environment:
      POSTGRES_PASSWORD: ${DB_PASSWORD:-gitea}
    volumes:
      - ./postgres:/var/lib/postgresql/data
"#;

#[test]
fn test_round_trip_keeps_units_and_edges() {
    let original = parse_compose(STACK).unwrap();
    let ConversionResult::Success(conversion) = convert(STACK, &ConvertOptions::default()) else {
        panic!("stack should convert");
    };

    let reparsed = parse_compose(&compose_section(&conversion.target_text)).unwrap();
    assert_eq!(reparsed.service_names(), original.service_names());
    assert_eq!(reparsed.dependency_edges(), original.dependency_edges());

    let keys: Vec<_> = conversion
        .package
        .form_fields()
        .iter()
        .map(|f| f.env_key.as_str())
        .collect();
    assert_eq!(
        keys,
        vec!["PANEL_APP_PORT_HTTP", "PANEL_APP_PORT_SERVER_22", "DB_PASSWORD"]
    );
    assert_eq!(conversion.package.key(), "gitea");
    assert_eq!(conversion.package.version, "1.22");
}

#[test]
fn test_reverse_mapping_adds_no_units() {
    let ConversionResult::Success(first) = convert(STACK, &ConvertOptions::default()) else {
        panic!("stack should convert");
    };
    let restored = restore_compose_text(&first.package).unwrap();
    let ConversionResult::Success(second) = convert(&restored, &ConvertOptions::default()) else {
        panic!("restored stack should convert");
    };

    assert_eq!(
        second.package.compose.service_names(),
        first.package.compose.service_names()
    );
    assert_eq!(
        second.package.compose.dependency_edges(),
        first.package.compose.dependency_edges()
    );
}

proptest! {
    #[test]
    fn prop_tool_output_is_deterministic(
        image in "[a-z]{1,8}",
        tag in "[0-9]{1,2}\\.[0-9]{1,2}",
        published in 1024u16..60000,
        target in 1u16..1024,
    ) {
        let source = format!(
            "services:\n  app:\n    image: {image}:{tag}\n    ports:\n      - \"{published}:{target}\"\n"
        );
        let first = run_compose_tool(&source);
        let second = run_compose_tool(&source);
        prop_assert!(first.is_success());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_errors_locate_real_paths(
        mode in prop_oneof![Just("host"), Just("none"), Just("service:db"), Just("container:x")],
    ) {
        let source = format!("services:\n  web:\n    image: nginx\n    network_mode: \"{mode}\"\n");
        let doc: serde_yaml::Value = serde_yaml::from_str(&source).unwrap();
        match run_compose_tool(&source) {
            ToolOutcome::Failure { locator: Some(locator), .. } => {
                prop_assert!(get_at_path(&doc, &parse_path(&locator)).is_some());
            }
            other => prop_assert!(false, "unexpected outcome {:?}", other),
        }
    }
}
