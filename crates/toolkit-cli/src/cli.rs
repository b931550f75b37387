//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Toolkit - browse developer tools and convert Docker Compose files
#[derive(Parser, Debug)]
#[command(name = "toolkit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List registered tools
    List {
        /// Only show tools in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Search tools by name, description and keywords
    ///
    /// Every term must match.
    ///
    /// Examples:
    ///   toolkit search docker
    ///   toolkit search compose 1panel
    Search {
        /// Search terms
        #[arg(required = true)]
        terms: Vec<String>,
    },

    /// Show details of a tool
    Info {
        /// Tool path, e.g. /docker-compose-to-1panel-appstore
        path: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Run a tool on a file or stdin
    Run {
        /// Tool path
        path: String,

        /// Input file (stdin when omitted or `-`)
        file: Option<PathBuf>,
    },

    /// Convert a Docker Compose file to a 1Panel AppStore package
    ///
    /// Examples:
    ///   toolkit convert docker-compose.yml
    ///   toolkit convert docker-compose.yml --key halo --out ./apps
    ///   cat docker-compose.yml | toolkit convert --json
    Convert {
        /// Compose file (stdin when omitted or `-`)
        file: Option<PathBuf>,

        /// App key, used as the package directory name
        #[arg(long)]
        key: Option<String>,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Version directory name
        #[arg(long = "app-version")]
        app_version: Option<String>,

        /// Service that receives PANEL_APP_PORT_HTTP
        #[arg(long)]
        primary: Option<String>,

        /// TOML file with conversion options and app metadata
        #[arg(short, long)]
        metadata: Option<PathBuf>,

        /// Write the package files under this directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show the application configuration
    Config {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_convert_flags() {
        let cli = Cli::parse_from([
            "toolkit",
            "convert",
            "compose.yml",
            "--key",
            "halo",
            "--app-version",
            "2.20",
            "--json",
        ]);
        match cli.command {
            Some(Commands::Convert {
                file,
                key,
                app_version,
                json,
                ..
            }) => {
                assert_eq!(file, Some(PathBuf::from("compose.yml")));
                assert_eq!(key.as_deref(), Some("halo"));
                assert_eq!(app_version.as_deref(), Some("2.20"));
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::parse_from(["toolkit", "list", "-v"]);
        assert!(cli.verbose);
    }

    #[test]
    fn test_search_requires_terms() {
        assert!(Cli::try_parse_from(["toolkit", "search"]).is_err());
    }
}
