//! Command implementations for toolkit-cli

pub mod config;
pub mod convert;
pub mod info;
pub mod list;
pub mod run;
pub mod search;

pub use config::run_config;
pub use convert::{ConvertArgs, run_convert};
pub use info::run_info;
pub use list::run_list;
pub use run::run_tool;
pub use search::run_search;

use std::io::Read;
use std::path::Path;

use colored::Colorize;
use toolkit_registry::{ToolDescriptor, ToolRegistry};

use crate::error::Result;

/// Read a file, or stdin when the path is absent or `-`.
pub(crate) fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

pub(crate) fn registry() -> Result<ToolRegistry> {
    Ok(ToolRegistry::with_builtins()?)
}

/// One line per tool: path, name and a dimmed description.
pub(crate) fn print_tool_line(tool: &ToolDescriptor) {
    println!(
        "  {:<36} {} {}",
        tool.path.as_str().green(),
        tool.name,
        format!("({})", tool.description).dimmed()
    );
}
