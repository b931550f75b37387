//! List registered tools

use colored::Colorize;

use super::{print_tool_line, registry};
use crate::error::Result;

/// Run the list command
pub fn run_list(category_filter: Option<&str>, json: bool) -> Result<()> {
    let registry = registry()?;

    let tools: Vec<_> = match category_filter {
        Some(category) => registry.by_category(category),
        None => registry.list_all().iter().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(());
    }

    if let Some(category) = category_filter
        && tools.is_empty()
    {
        eprintln!(
            "{} Unknown category '{}'. Valid: {}",
            "warning:".yellow().bold(),
            category,
            registry.categories().join(", ")
        );
    }

    println!("{}", "Available Tools".bold());
    println!();

    for category in registry.categories() {
        let in_category: Vec<_> = tools.iter().filter(|t| t.category == category).collect();
        if in_category.is_empty() {
            continue;
        }
        println!("{}:", category.cyan().bold());
        for tool in in_category {
            print_tool_line(tool);
        }
        println!();
    }

    println!(
        "{} {} tools available. Use {} to try one.",
        "Total:".dimmed(),
        tools.len(),
        "toolkit run <path>".cyan()
    );

    Ok(())
}
