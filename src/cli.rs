//! Command-line interface definitions.
//!
//! Two subcommands share a global `--config` option:
//!
//! ```sh
//! # Scan five pages of Scimex stories and export matches
//! scimex_retraction_checker check --pages 5 --output retracted_on_scimex.csv
//!
//! # Build media-monitoring queries from an expert-reaction page
//! scimex_retraction_checker query --url https://www.scimex.org/newsfeed/expert-reaction
//! ```

use crate::outputs::export::DEFAULT_EXPORT_FILE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, global = true, env = "SCIMEX_CHECKER_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Check Scimex stories for DOIs on the Retraction Watch list
    Check {
        /// How many pages of the news feed to crawl
        #[arg(short, long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=20))]
        pages: u32,

        /// Where to write the CSV of matches
        #[arg(short, long, default_value = DEFAULT_EXPORT_FILE)]
        output: PathBuf,

        /// Print matches without writing the CSV
        #[arg(long)]
        no_export: bool,

        /// Download the Retraction Watch list even if the cached copy is fresh
        #[arg(long)]
        refresh_registry: bool,
    },
    /// Build Boolean media-monitoring queries from a page's headings
    Query {
        /// Page to scan
        #[arg(short, long)]
        url: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_defaults() {
        let cli = Cli::parse_from(["scimex_retraction_checker", "check"]);
        assert_eq!(cli.config, None);
        assert_eq!(
            cli.command,
            Command::Check {
                pages: 5,
                output: PathBuf::from(DEFAULT_EXPORT_FILE),
                no_export: false,
                refresh_registry: false,
            }
        );
    }

    #[test]
    fn test_check_flags() {
        let cli = Cli::parse_from([
            "scimex_retraction_checker",
            "check",
            "-p",
            "20",
            "-o",
            "/tmp/out.csv",
            "--no-export",
            "--refresh-registry",
            "--config",
            "checker.yaml",
        ]);
        assert_eq!(cli.config.as_deref(), Some("checker.yaml"));
        assert_eq!(
            cli.command,
            Command::Check {
                pages: 20,
                output: PathBuf::from("/tmp/out.csv"),
                no_export: true,
                refresh_registry: true,
            }
        );
    }

    #[test]
    fn test_page_count_is_bounded() {
        assert!(Cli::try_parse_from(["scimex_retraction_checker", "check", "--pages", "0"]).is_err());
        assert!(Cli::try_parse_from(["scimex_retraction_checker", "check", "--pages", "21"]).is_err());
        assert!(Cli::try_parse_from(["scimex_retraction_checker", "check", "--pages", "1"]).is_ok());
    }

    #[test]
    fn test_query_requires_url() {
        assert!(Cli::try_parse_from(["scimex_retraction_checker", "query"]).is_err());
        let cli = Cli::parse_from(["scimex_retraction_checker", "query", "--url", "https://example.org"]);
        assert_eq!(
            cli.command,
            Command::Query {
                url: "https://example.org".to_string()
            }
        );
    }
}
