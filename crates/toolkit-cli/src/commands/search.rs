//! Search tools

use colored::Colorize;

use super::{print_tool_line, registry};
use crate::error::Result;

/// Run the search command
pub fn run_search(terms: &[String]) -> Result<()> {
    let registry = registry()?;
    let query = terms.join(" ");
    let found = registry.search(&query);

    if found.is_empty() {
        println!("No tools match '{}'.", query);
        return Ok(());
    }

    for tool in &found {
        print_tool_line(tool);
    }
    println!();
    println!("{} {} found", "Total:".dimmed(), found.len());
    Ok(())
}
