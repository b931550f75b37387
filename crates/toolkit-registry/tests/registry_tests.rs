//! Registry behavior through the public API

use pretty_assertions::assert_eq;
use rstest::rstest;
use std::sync::Arc;
use std::thread;
use toolkit_registry::{
    Error, LazyComponent, ToolComponent, ToolDescriptor, ToolOutcome, ToolRegistry,
    builtin_descriptors,
};

const COMPOSE_TOOL: &str = "/docker-compose-to-1panel-appstore";

struct Reverse;

impl ToolComponent for Reverse {
    fn run(&self, input: &str) -> ToolOutcome {
        ToolOutcome::success(input.chars().rev().collect::<String>())
    }
}

fn reverse_tool() -> ToolDescriptor {
    ToolDescriptor::new(
        "/reverse",
        "Reverse Text",
        chrono::NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        LazyComponent::new(|| Arc::new(Reverse)),
    )
    .with_description("Reverse a string")
    .with_keywords(["text"])
    .with_category("Text")
}

#[rstest]
#[case(COMPOSE_TOOL)]
#[case("docker-compose-to-1panel-appstore")]
fn test_builtin_lookup(#[case] path: &str) {
    let registry = ToolRegistry::with_builtins().unwrap();
    let tool = registry.lookup(path).unwrap();
    assert_eq!(tool.path.as_str(), COMPOSE_TOOL);
    assert_eq!(
        tool.description,
        "Convert Docker Compose files to 1Panel AppStore format"
    );
}

#[test]
fn test_builtins_plus_custom_tools() {
    let mut builder = ToolRegistry::builder();
    builder.register_all(builtin_descriptors()).unwrap();
    builder.register(reverse_tool()).unwrap();
    let registry = builder.build();

    assert_eq!(registry.categories(), vec!["Docker", "Text"]);
    assert_eq!(registry.search("1panel")[0].path.as_str(), COMPOSE_TOOL);
    assert_eq!(registry.search("text")[0].name, "Reverse Text");
    assert_eq!(
        registry.lookup("/reverse").unwrap().component.load().run("abc"),
        ToolOutcome::success("cba")
    );
}

#[test]
fn test_registering_builtins_twice_fails() {
    let mut builder = ToolRegistry::builder();
    builder.register_all(builtin_descriptors()).unwrap();
    let err = builder.register_all(builtin_descriptors()).unwrap_err();
    assert_eq!(
        err,
        Error::DuplicateRoute {
            path: COMPOSE_TOOL.into()
        }
    );
}

#[test]
fn test_component_loads_on_first_run_only() {
    let registry = ToolRegistry::with_builtins().unwrap();
    let tool = registry.lookup(COMPOSE_TOOL).unwrap();

    assert!(registry.search("docker").len() == 1 && !tool.component.is_loaded());
    let first = tool.component.load();
    let second = tool.component.load();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_shared_registry_across_threads() {
    let registry = Arc::new(ToolRegistry::with_builtins().unwrap());
    let source = "services:\n  web:\n    image: nginx:latest\n    ports: ['80:80']\n";

    let outputs: Vec<String> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let tool = registry.lookup(COMPOSE_TOOL).unwrap();
                tool.component.load().run(source).output().unwrap().to_string()
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();

    assert!(outputs.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_descriptor_json_surface() {
    let registry = ToolRegistry::with_builtins().unwrap();
    let json = serde_json::to_value(registry.list_all()).unwrap();
    assert_eq!(json[0]["name"], "Docker Compose to 1Panel AppStore");
    assert_eq!(json[0]["icon"], "tabler:brand-docker");
    assert_eq!(json[0]["created_at"], "2025-09-03");
    assert_eq!(json[0]["keywords"].as_array().unwrap().len(), 5);
}
