//! Compose → 1Panel AppStore conversion command

use std::fs;
use std::path::{Path, PathBuf};

use colored::Colorize;
use toolkit_compose::{Conversion, ConvertOptions, convert_str};
use tracing::debug;

use super::read_input;
use crate::error::Result;

/// Arguments of the convert command.
#[derive(Debug, Clone, Default)]
pub struct ConvertArgs {
    pub file: Option<PathBuf>,
    pub key: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub primary: Option<String>,
    pub metadata: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub json: bool,
}

/// Run the convert command
pub fn run_convert(args: &ConvertArgs) -> Result<()> {
    let options = load_options(args)?;
    let source = read_input(args.file.as_deref())?;
    let conversion = convert_str(&source, &options)?;

    for warning in &conversion.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }

    if let Some(out) = &args.out {
        let written = write_package(&conversion, out)?;
        if !args.json {
            for path in &written {
                println!("  {} {}", "+".green(), path.display());
            }
            println!(
                "{} Wrote {} files for {}",
                "OK".green().bold(),
                written.len(),
                conversion.package.key().cyan()
            );
            return Ok(());
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&conversion_json(&conversion)?)?);
    } else {
        print!("{}", conversion.target_text);
    }
    Ok(())
}

/// Options from the metadata file, overridden by command-line flags.
pub fn load_options(args: &ConvertArgs) -> Result<ConvertOptions> {
    let mut options = match &args.metadata {
        Some(path) => {
            debug!(path = %path.display(), "Loading conversion options");
            toml::from_str(&fs::read_to_string(path)?)?
        }
        None => ConvertOptions::default(),
    };
    if let Some(key) = &args.key {
        options.key = Some(key.clone());
    }
    if let Some(name) = &args.name {
        options.name = Some(name.clone());
    }
    if let Some(version) = &args.version {
        options.version = Some(version.clone());
    }
    if let Some(primary) = &args.primary {
        options.primary_service = Some(primary.clone());
    }
    Ok(options)
}

/// Write every package file under `out`, creating directories as needed.
pub fn write_package(conversion: &Conversion, out: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for file in conversion.package.files()? {
        let path = out.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &file.contents)?;
        debug!(path = %path.display(), "Wrote package file");
        written.push(path);
    }
    Ok(written)
}

fn conversion_json(conversion: &Conversion) -> Result<serde_json::Value> {
    let package = &conversion.package;
    let files: Vec<_> = package
        .files()?
        .into_iter()
        .map(|f| serde_json::json!({ "path": f.path, "contents": f.contents }))
        .collect();
    let warnings: Vec<_> = conversion
        .warnings
        .iter()
        .map(|w| serde_json::json!({ "path": w.path, "message": w.message }))
        .collect();
    Ok(serde_json::json!({
        "key": package.key(),
        "version": package.version,
        "files": files,
        "warnings": warnings,
    }))
}
