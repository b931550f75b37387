//! Built-in tool descriptors
//!
//! Every shipped tool is declared here. Listing, lookup and the CLI derive
//! from [`builtin_descriptors`].

use std::sync::Arc;

use chrono::NaiveDate;
use toolkit_compose::{ComposeToAppStore, ConversionResult, ConvertOptions, Converter};

use super::component::{LazyComponent, ToolComponent, ToolOutcome};
use super::types::ToolDescriptor;

/// Number of built-in tools.
pub const BUILTIN_COUNT: usize = 1;

const COMPOSE_TO_APPSTORE_CREATED: NaiveDate = match NaiveDate::from_ymd_opt(2025, 9, 3) {
    Some(date) => date,
    None => panic!("invalid creation date"),
};

/// Returns all built-in tool descriptors, in display order.
pub fn builtin_descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "/docker-compose-to-1panel-appstore",
            "Docker Compose to 1Panel AppStore",
            COMPOSE_TO_APPSTORE_CREATED,
            LazyComponent::new(|| Arc::new(ComposeConverterTool::default())),
        )
        .with_description("Convert Docker Compose files to 1Panel AppStore format")
        .with_keywords(["docker", "compose", "1panel", "appstore", "convert"])
        .with_category("Docker")
        .with_icon("tabler:brand-docker"),
    ]
}

/// Runs a [`Converter`] as a registry tool.
pub struct ComposeConverterTool {
    converter: Box<dyn Converter>,
}

impl ComposeConverterTool {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            converter: Box::new(ComposeToAppStore::new(options)),
        }
    }
}

impl Default for ComposeConverterTool {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

impl ToolComponent for ComposeConverterTool {
    fn run(&self, input: &str) -> ToolOutcome {
        match self.converter.convert(input) {
            ConversionResult::Success(conversion) => ToolOutcome::Success {
                output: conversion.target_text,
                warnings: conversion.warnings.iter().map(ToString::to_string).collect(),
            },
            ConversionResult::Failure(err) => ToolOutcome::failure(err.locator(), err.to_string()),
        }
    }
}
