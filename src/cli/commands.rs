//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Page through a cursor-paginated JSON API with cached cursors
#[derive(Parser, Debug)]
#[command(name = "cursor-pages")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run configuration file (YAML)
    #[arg(short, long, global = true, default_value = "pager.yaml")]
    pub config: PathBuf,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch one page (1-based)
    Page {
        /// Page number
        #[arg(allow_hyphen_values = true)]
        number: String,
    },

    /// Show cached checkpoints and counts for the configured query
    Inspect,

    /// Remove cached state for the configured query
    Clear,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Single-line JSON
    Json,
    /// Indented JSON
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_command() {
        let cli = Cli::parse_from(["cursor-pages", "-c", "events.yaml", "page", "3"]);
        assert_eq!(cli.config, PathBuf::from("events.yaml"));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Page { ref number } if number == "3"));
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::parse_from(["cursor-pages", "inspect", "--format", "pretty", "-v"]);
        assert_eq!(cli.config, PathBuf::from("pager.yaml"));
        assert_eq!(cli.format, OutputFormat::Pretty);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Inspect));
    }

    #[test]
    fn test_negative_page_number_is_passed_through() {
        let cli = Cli::parse_from(["cursor-pages", "page", "-1"]);
        assert!(matches!(cli.command, Commands::Page { ref number } if number == "-1"));
    }
}
