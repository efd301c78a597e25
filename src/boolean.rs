//! Boolean search query builder for media-monitoring tools.
//!
//! Scans the headings of a web page for biographical sentences such as
//!
//! ```text
//! Dr Jane Smith is a professor at the University of Example
//! ```
//!
//! and turns every (name, organization) pair into a clause that finds radio
//! coverage mentioning the person by full name, or by first name near their
//! organization:
//!
//! ```text
//! (medium:Radio AND (("Jane Smith") OR (("Jane") NEAR/10 ("University of Example"))))
//! ```
//!
//! Parsing is heuristic. The organization starts after the first "at", unless
//! a later "at the" narrows it: in "a fellow at the School of Biology at the
//! University of Example" the organization is "University of Example", while
//! "a professor at the University of Texas at Austin" keeps the whole name.
//! Lines that do not fit the pattern are skipped rather than guessed at.

use crate::config::QueryConfig;
use crate::fetch::FetchPage;
use crate::models::{BooleanQuery, NameOrganization};
use crate::scrapers::scimex::parse_selector;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::error::Error;
use tracing::{debug, info, instrument};

const NAME_TOKEN: &str = r"\p{Lu}[\p{L}'’\-]*\.?";

static AT_THE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bat\s+the\s+").unwrap());

/// Compiled line pattern and query settings.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    pattern: Regex,
    heading: Selector,
    medium: String,
    proximity: u32,
}

impl QueryBuilder {
    /// Build the line pattern from the configured titles.
    ///
    /// # Errors
    ///
    /// Returns an error if the heading tag is not a valid selector.
    pub fn from_config(config: &QueryConfig) -> Result<Self, Box<dyn Error>> {
        let titles = config
            .titles
            .iter()
            .map(|t| t.trim().trim_end_matches('.'))
            .filter(|t| !t.is_empty())
            .sorted_by_key(|t| std::cmp::Reverse(t.len()))
            .map(regex::escape)
            .join("|");

        let title_group = if titles.is_empty() {
            String::new()
        } else {
            format!(r"(?:(?P<title>{titles})\.?\s+)?")
        };
        let pattern = format!(
            r"^{title_group}(?P<name>{NAME_TOKEN}(?:\s+{NAME_TOKEN})*)\s+is\s+.*?\bat\s+(?P<org>.+?)\s*$"
        );

        Ok(Self {
            pattern: Regex::new(&pattern)?,
            heading: parse_selector(&config.heading_tag)?,
            medium: config.medium.clone(),
            proximity: config.proximity,
        })
    }

    /// Parse one line, or `None` when it does not look like a biography.
    pub fn parse_line(&self, line: &str) -> Option<NameOrganization> {
        let caps = self.pattern.captures(line.trim())?;
        let name = caps.name("name")?.as_str().to_string();
        let organization = clean_organization(caps.name("org")?.as_str());
        if organization.is_empty() {
            return None;
        }
        Some(NameOrganization {
            title: caps.name("title").map(|t| t.as_str().to_string()),
            name,
            organization,
        })
    }

    /// Text lines of every heading at the configured level.
    pub fn heading_lines(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.heading)
            .flat_map(|h| {
                h.text()
                    .collect::<String>()
                    .lines()
                    .map(|l| l.split_whitespace().join(" "))
                    .filter(|l| !l.is_empty())
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// All distinct (name, organization) pairs found in the page headings.
    pub fn extract_pairs(&self, html: &str) -> Vec<NameOrganization> {
        self.heading_lines(html)
            .iter()
            .filter_map(|line| {
                let parsed = self.parse_line(line);
                if parsed.is_none() {
                    debug!(%line, "No name/organization match; skipping line");
                }
                parsed
            })
            .unique_by(|p| (p.name.clone(), p.organization.clone()))
            .collect()
    }

    /// Clause for a single pair.
    pub fn clause(&self, pair: &NameOrganization) -> String {
        format!(
            r#"(medium:{} AND (("{}") OR (("{}") NEAR/{} ("{}"))))"#,
            self.medium,
            pair.name,
            pair.first_name(),
            self.proximity,
            pair.organization
        )
    }

    /// Combine pairs into the full and names-only queries.
    pub fn build(&self, pairs: Vec<NameOrganization>) -> BooleanQuery {
        let full_query = pairs.iter().map(|p| self.clause(p)).join(" OR ");
        let names_query = pairs
            .iter()
            .map(|p| p.name.as_str())
            .unique()
            .map(|n| format!(r#""{n}""#))
            .join(" OR ");
        BooleanQuery {
            full_query,
            names_query,
            pairs,
        }
    }
}

/// Keep the part after the last "at the", then strip a leading "The" and
/// trailing punctuation.
fn clean_organization(org: &str) -> String {
    let org = match AT_THE_RE.find_iter(org).last() {
        Some(m) => &org[m.end()..],
        None => org,
    };
    let org = org.trim().trim_end_matches(['.', ',', ';', ':']);
    let org = org
        .strip_prefix("The ")
        .or_else(|| org.strip_prefix("the "))
        .unwrap_or(org);
    org.trim().to_string()
}

/// Fetch `url` and build the Boolean queries from its headings.
///
/// # Errors
///
/// A failed fetch is returned. A page with no matching headings is not an
/// error; it yields empty queries.
#[instrument(level = "info", skip(fetcher, config))]
pub async fn build_query_for_url<F: FetchPage>(
    fetcher: &F,
    url: &str,
    config: &QueryConfig,
) -> Result<BooleanQuery, Box<dyn Error>> {
    let builder = QueryBuilder::from_config(config)?;
    let html = fetcher.fetch_text(url, config.timeout()).await?;
    let pairs = builder.extract_pairs(&html);
    info!(count = pairs.len(), "Extracted name/organization pairs");
    Ok(builder.build(pairs))
}
