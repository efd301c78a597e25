//! # Scimex Retraction Checker
//!
//! Checks science-news stories published on [Scimex](https://www.scimex.org)
//! for DOIs that appear on the [Retraction Watch](https://retractionwatch.com)
//! list, and builds Boolean media-monitoring queries from expert pages.
//!
//! ## Usage
//!
//! ```sh
//! scimex_retraction_checker check --pages 5
//! scimex_retraction_checker query --url https://www.scimex.org/newsfeed/expert-reaction
//! ```
//!
//! ## Architecture
//!
//! The `check` command is a sequential pipeline:
//! 1. **Registry**: Load the Retraction Watch DOI list (cached for 24 hours)
//! 2. **Indexing**: Collect story URLs from the paginated news feed
//! 3. **Fetching**: Download each story and extract its DOIs
//! 4. **Output**: Print matches and write them to CSV
//!
//! Requests are issued one at a time with a fixed pause between them.

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod boolean;
mod check;
mod cli;
mod config;
mod doi;
mod fetch;
mod models;
mod outputs;
mod registry;
mod report;
mod scrapers;
mod utils;

use boolean::build_query_for_url;
use check::{CheckOptions, run_check};
use cli::{Cli, Command};
use config::Config;
use fetch::HttpFetcher;
use outputs::table::render_table;
use registry::RegistryCache;
use report::affected_story_count;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("scimex_retraction_checker starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = Config::load(args.config.as_deref()).await?;
    let fetcher = HttpFetcher::new()?;

    match args.command {
        Command::Check {
            pages,
            output,
            no_export,
            refresh_registry,
        } => {
            let mut cache = match &config.registry.cache_path {
                Some(path) => RegistryCache::with_path(config.registry.ttl(), path).await,
                None => RegistryCache::new(config.registry.ttl()),
            };
            let options = CheckOptions {
                pages,
                export_path: (!no_export).then_some(output),
                refresh_registry,
            };

            let outcome = match run_check(&fetcher, &config, &mut cache, &options, Utc::now()).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(error = %e, "Retraction check failed");
                    return Err(e);
                }
            };

            println!("Loaded {} retracted DOIs.", outcome.retracted_count);
            println!(
                "Found {} stories, scanned {}.",
                outcome.stories_found, outcome.stories_scanned
            );
            if outcome.matches.is_empty() {
                println!("No retracted DOIs found on Scimex stories.");
            } else {
                println!(
                    "Found {} retracted DOI citations in {} stories.\n",
                    outcome.matches.len(),
                    affected_story_count(&outcome.matches)
                );
                print!("{}", render_table(&outcome.matches));
                if let Some(path) = &outcome.exported_to {
                    println!("\nResults written to {}", path.display());
                }
            }
        }
        Command::Query { url } => {
            let query = match build_query_for_url(&fetcher, &url, &config.query).await {
                Ok(query) => query,
                Err(e) => {
                    error!(%url, error = %e, "Failed to fetch page");
                    return Err(e);
                }
            };

            if query.pairs.is_empty() {
                println!("No name/organization pairs found.");
            }
            for pair in &query.pairs {
                match &pair.title {
                    Some(title) => println!("{} {} | {}", title, pair.name, pair.organization),
                    None => println!("{} | {}", pair.name, pair.organization),
                }
            }
            println!("\nBoolean query:\n{}", query.full_query);
            println!("\nNames only:\n{}", query.names_query);
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}
