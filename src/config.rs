//! Runtime configuration loaded from an optional YAML file.
//!
//! Every field has a default, so the file only needs to contain the keys a
//! user wants to change:
//!
//! ```yaml
//! feed:
//!   base_url: https://www.scimex.org
//!   content_selector: ".field-name-body"
//! query:
//!   heading_tag: h3
//!   titles: [Dr, Professor, Chief Scientist]
//! ```

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, instrument};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub registry: RegistryConfig,
    pub feed: FeedConfig,
    pub query: QueryConfig,
}

/// Where the Retraction Watch list lives and how long it stays fresh.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RegistryConfig {
    /// URL of the Retraction Watch CSV export.
    pub url: String,
    /// Header of the column holding the retraction notice DOI.
    pub doi_column: String,
    /// How long a downloaded list is reused, in hours.
    pub ttl_hours: i64,
    pub timeout_secs: u64,
    /// Where the downloaded list is persisted between runs. `None` keeps it
    /// in memory only.
    pub cache_path: Option<PathBuf>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: "https://gitlab.com/crossref/retraction-watch-data/-/raw/main/retraction_watch.csv"
                .to_string(),
            doi_column: "RetractionDOI".to_string(),
            ttl_hours: 24,
            timeout_secs: 60,
            cache_path: Some(PathBuf::from(".scimex_cache/retracted_dois.json")),
        }
    }
}

impl RegistryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.ttl_hours)
    }
}

/// Scimex news feed crawling and story extraction.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    pub base_url: String,
    /// Selector for story anchors on a listing page.
    pub link_selector: String,
    /// Only hrefs starting with this prefix are kept.
    pub link_prefix: String,
    /// Selector for the story headline.
    pub title_selector: String,
    /// Selector for the blocks scanned for DOIs. `None` scans the whole page.
    pub content_selector: Option<String>,
    pub page_delay_ms: u64,
    pub story_delay_ms: u64,
    pub page_timeout_secs: u64,
    pub story_timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.scimex.org".to_string(),
            link_selector: "a.story-title".to_string(),
            link_prefix: "/newsfeed".to_string(),
            title_selector: "h1".to_string(),
            content_selector: None,
            page_delay_ms: 1000,
            story_delay_ms: 500,
            page_timeout_secs: 30,
            story_timeout_secs: 10,
        }
    }
}

impl FeedConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn story_delay(&self) -> Duration {
        Duration::from_millis(self.story_delay_ms)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn story_timeout(&self) -> Duration {
        Duration::from_secs(self.story_timeout_secs)
    }
}

/// Boolean query builder settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct QueryConfig {
    /// Heading element whose text is scanned, e.g. `h2`.
    pub heading_tag: String,
    /// Professional titles that may precede a name.
    pub titles: Vec<String>,
    pub medium: String,
    pub proximity: u32,
    pub timeout_secs: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            heading_tag: "h2".to_string(),
            titles: [
                "Dr",
                "Doctor",
                "Professor",
                "Prof",
                "Associate Professor",
                "Assoc Prof",
                "Emeritus Professor",
                "Mr",
                "Mrs",
                "Ms",
                "Miss",
                "Sir",
                "Dame",
            ]
            .iter()
            .map(|t| t.to_string())
            .collect(),
            medium: "Radio".to_string(),
            proximity: 10,
            timeout_secs: 20,
        }
    }
}

impl QueryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Parse configuration from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self, Box<dyn Error>> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load configuration from `path`, or return the defaults when no path is
    /// given.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML for
    /// this schema.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> Result<Self, Box<dyn Error>> {
        let Some(path) = path else {
            info!("No config file given; using defaults");
            return Ok(Self::default());
        };
        let yaml = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("failed to read config {path}: {e}"))?;
        let config = Self::from_yaml(&yaml)?;
        info!(path, "Loaded configuration");
        Ok(config)
    }
}
