//! Configuration display

use colored::Colorize;

use crate::config::AppConfig;
use crate::error::Result;

/// Display the application configuration
pub fn run_config(json: bool) -> Result<()> {
    let config = AppConfig::from_env();

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("{}", "Toolkit Configuration".bold());
    println!();
    println!("  {:<14} {}", "Version:".dimmed(), config.version);
    println!("  {:<14} {}", "Base URL:".dimmed(), config.base_url);
    let env = if config.is_production() {
        config.env.green().to_string()
    } else {
        config.env.yellow().to_string()
    };
    println!("  {:<14} {}", "Environment:".dimmed(), env);
    let sha = if config.last_commit_sha.is_empty() {
        "(unknown)".dimmed().to_string()
    } else {
        config.last_commit_sha.clone()
    };
    println!("  {:<14} {}", "Commit:".dimmed(), sha);

    Ok(())
}
