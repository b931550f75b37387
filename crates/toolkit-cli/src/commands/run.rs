//! Run a registered tool

use std::path::Path;

use colored::Colorize;
use toolkit_registry::ToolOutcome;
use tracing::debug;

use super::{read_input, registry};
use crate::error::{CliError, Result};

/// Look the tool up, load its component and run it on the input.
pub fn run_tool(path: &str, file: Option<&Path>) -> Result<()> {
    let registry = registry()?;
    let tool = registry.lookup(path)?;
    let input = read_input(file)?;

    debug!(path = %tool.path, bytes = input.len(), "Running tool");
    match tool.component.load().run(&input) {
        ToolOutcome::Success { output, warnings } => {
            for warning in &warnings {
                eprintln!("{} {}", "warning:".yellow().bold(), warning);
            }
            print!("{output}");
            Ok(())
        }
        ToolOutcome::Failure { locator, message } => Err(CliError::ToolFailed {
            path: tool.path.to_string(),
            locator,
            message,
        }),
    }
}
