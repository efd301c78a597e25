//! The retraction check pipeline.
//!
//! Registry → feed crawl → story extraction → matching → export, one step
//! after another. Only the registry load and the export are fatal; a listing
//! page or story that fails is skipped.

use crate::config::Config;
use crate::fetch::FetchPage;
use crate::models::MatchRecord;
use crate::outputs::export::write_matches_csv;
use crate::registry::RegistryCache;
use crate::report::find_matches;
use crate::scrapers::scimex::{StorySelectors, fetch_stories, index_story_links};
use crate::utils::ensure_parent_writable;
use chrono::{DateTime, Utc};
use std::error::Error;
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

/// What a single check run should do.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Listing pages to crawl.
    pub pages: u32,
    /// CSV destination; `None` skips the export.
    pub export_path: Option<PathBuf>,
    /// Ignore a fresh cached registry.
    pub refresh_registry: bool,
}

/// Summary of a finished run.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub retracted_count: usize,
    pub stories_found: usize,
    pub stories_scanned: usize,
    pub matches: Vec<MatchRecord>,
    /// Where the CSV was written, if it was.
    pub exported_to: Option<PathBuf>,
}

/// Run the whole check.
///
/// # Errors
///
/// Fails on invalid selectors, an unwritable export path, a registry that
/// cannot be loaded, or a failed export write. An empty result is `Ok`.
#[instrument(level = "info", skip(fetcher, config, cache, now))]
pub async fn run_check<F: FetchPage>(
    fetcher: &F,
    config: &Config,
    cache: &mut RegistryCache,
    options: &CheckOptions,
    now: DateTime<Utc>,
) -> Result<CheckOutcome, Box<dyn Error>> {
    let selectors = StorySelectors::from_config(&config.feed)?;
    if let Some(path) = &options.export_path {
        ensure_parent_writable(path).await?;
    }

    if options.refresh_registry {
        cache.invalidate();
    }
    debug!(cached_at = ?cache.fetched_at(), "Registry cache state");
    let retracted = cache.get_or_refresh(fetcher, &config.registry, now).await?;
    if retracted.is_empty() {
        warn!("Retraction Watch list is empty; nothing can match");
    }
    info!(count = retracted.len(), "Retraction Watch DOIs ready");

    let links = index_story_links(fetcher, &config.feed, &selectors, options.pages).await?;
    let stories = fetch_stories(fetcher, &links, &config.feed, &selectors).await;
    let matches = find_matches(&stories, retracted);
    info!(
        stories_found = links.len(),
        stories_scanned = stories.len(),
        matches = matches.len(),
        "Retraction check complete"
    );

    let exported_to = match &options.export_path {
        Some(path) if !matches.is_empty() => {
            write_matches_csv(&matches, path).await?;
            Some(path.clone())
        }
        _ => None,
    };

    Ok(CheckOutcome {
        retracted_count: retracted.len(),
        stories_found: links.len(),
        stories_scanned: stories.len(),
        matches,
        exported_to,
    })
}
