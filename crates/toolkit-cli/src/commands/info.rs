//! Tool details

use colored::Colorize;

use super::registry;
use crate::error::{CliError, Result};

/// Display detailed information about a tool
pub fn run_info(path: &str, json: bool) -> Result<()> {
    let registry = registry()?;
    let tool = registry.lookup(path).map_err(|_| {
        CliError::user(format!(
            "Unknown tool '{}'. Use 'toolkit list' to see available tools.",
            path
        ))
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(tool)?);
        return Ok(());
    }

    println!("{}", "Tool Information".bold());
    println!();
    println!("  {:<14} {}", "Name:".dimmed(), tool.name);
    println!("  {:<14} {}", "Path:".dimmed(), tool.path);
    println!("  {:<14} {}", "Category:".dimmed(), tool.category);
    println!("  {:<14} {}", "Description:".dimmed(), tool.description);
    println!("  {:<14} {}", "Keywords:".dimmed(), tool.keywords.join(", "));
    println!("  {:<14} {}", "Created:".dimmed(), tool.created_at);
    if let Some(icon) = &tool.icon {
        println!("  {:<14} {}", "Icon:".dimmed(), icon);
    }
    println!();
    println!(
        "Run it with {}",
        format!("toolkit run {} <file>", tool.path).cyan()
    );

    Ok(())
}
