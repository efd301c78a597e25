//! Retraction Watch registry loading and time-bounded caching.
//!
//! The registry is a large CSV published by Crossref. Only one column is
//! needed: the DOI of the retracted work. Downloading it takes a while, so
//! [`RegistryCache`] keeps the parsed set together with the time it was
//! fetched and only downloads again once the entry is older than the TTL.
//!
//! # Persistence
//!
//! Each CLI run is a fresh process, so the cache can also be written to a
//! JSON file. A file that cannot be read or parsed is treated as absent.

use crate::config::RegistryConfig;
use crate::fetch::FetchPage;
use crate::models::RetractedDoiSet;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Parse the registry CSV and collect the DOI column.
///
/// # Errors
///
/// Returns an error if the CSV has no `doi_column` header or a record cannot
/// be parsed.
pub fn parse_registry_csv(csv_text: &str, doi_column: &str) -> Result<RetractedDoiSet, Box<dyn Error>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let index = reader
        .headers()?
        .iter()
        .position(|h| h.trim() == doi_column)
        .ok_or_else(|| format!("registry CSV has no `{doi_column}` column"))?;

    let mut cells = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(cell) = record.get(index) {
            cells.push(cell.to_string());
        }
    }
    Ok(RetractedDoiSet::from_raw(cells))
}

/// Download and parse the registry.
#[instrument(level = "info", skip_all, fields(url = %config.url))]
pub async fn load_retracted_dois<F: FetchPage>(
    fetcher: &F,
    config: &RegistryConfig,
) -> Result<RetractedDoiSet, Box<dyn Error>> {
    let body = fetcher.fetch_text(&config.url, config.timeout()).await?;
    let set = parse_registry_csv(&body, &config.doi_column)?;
    info!(count = set.len(), "Loaded retracted DOIs");
    Ok(set)
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct CachedRegistry {
    fetched_at: DateTime<Utc>,
    dois: RetractedDoiSet,
}

/// A registry value plus the time it was fetched.
#[derive(Debug)]
pub struct RegistryCache {
    ttl: Duration,
    path: Option<PathBuf>,
    entry: Option<CachedRegistry>,
}

impl RegistryCache {
    /// In-memory cache with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            path: None,
            entry: None,
        }
    }

    /// Cache persisted at `path`, seeded from the file if it exists.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn with_path(ttl: Duration, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entry = match tokio::fs::read_to_string(&path).await {
            Ok(json) => match serde_json::from_str::<CachedRegistry>(&json) {
                Ok(entry) => {
                    debug!(fetched_at = %entry.fetched_at, "Read cached registry");
                    Some(entry)
                }
                Err(e) => {
                    warn!(error = %e, "Ignoring unreadable registry cache");
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable registry cache");
                None
            }
        };
        Self {
            ttl,
            path: Some(path),
            entry,
        }
    }

    /// When the current value was fetched, if there is one.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.entry.as_ref().map(|e| e.fetched_at)
    }

    /// Fresh when fetched within the TTL before `now`. A timestamp in the
    /// future (clock skew, hand-edited cache file) counts as stale.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.entry.as_ref().is_some_and(|e| {
            let age = now - e.fetched_at;
            age >= Duration::zero() && age < self.ttl
        })
    }

    /// Drop the current value so the next call fetches.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Return the cached set if it is fresh at `now`, otherwise fetch it,
    /// store it and return it.
    ///
    /// # Errors
    ///
    /// Fetch and parse failures are returned as is; there is no stale
    /// fallback. Failing to persist the new value is only logged.
    pub async fn get_or_refresh<F: FetchPage>(
        &mut self,
        fetcher: &F,
        config: &RegistryConfig,
        now: DateTime<Utc>,
    ) -> Result<&RetractedDoiSet, Box<dyn Error>> {
        if !self.is_fresh(now) {
            let dois = load_retracted_dois(fetcher, config).await?;
            let entry = CachedRegistry {
                fetched_at: now,
                dois,
            };
            if let Some(path) = &self.path {
                if let Err(e) = persist(path, &entry).await {
                    warn!(path = %path.display(), error = %e, "Failed to persist registry cache");
                }
            }
            self.entry = Some(entry);
        } else {
            info!("Using cached retracted DOI list");
        }

        match &self.entry {
            Some(entry) => Ok(&entry.dois),
            None => Err("registry cache is empty after refresh".into()),
        }
    }
}

async fn persist(path: &Path, entry: &CachedRegistry) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string(entry)?;
    tokio::fs::write(path, json).await?;
    debug!(path = %path.display(), "Persisted registry cache");
    Ok(())
}
