//! Toolkit CLI
//!
//! Browse the tool registry and run tools, starting with the Docker Compose
//! to 1Panel AppStore converter.

mod cli;
mod commands;
mod config;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use commands::ConvertArgs;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if logging::enabled(cli.verbose) {
        if let Err(e) = logging::init(cli.verbose) {
            eprintln!("{} failed to initialize logging: {}", "warning:".yellow().bold(), e);
        }
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!("{} Toolkit CLI", "toolkit".green().bold());
            println!();
            println!("Run {} for available commands.", "toolkit --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::List { category, json } => commands::run_list(category.as_deref(), json),
        Commands::Search { terms } => commands::run_search(&terms),
        Commands::Info { path, json } => commands::run_info(&path, json),
        Commands::Run { path, file } => commands::run_tool(&path, file.as_deref()),
        Commands::Convert {
            file,
            key,
            name,
            app_version,
            primary,
            metadata,
            out,
            json,
        } => commands::run_convert(&ConvertArgs {
            file,
            key,
            name,
            version: app_version,
            primary,
            metadata,
            out,
            json,
        }),
        Commands::Config { json } => commands::run_config(json),
    }
}
