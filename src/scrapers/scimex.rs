//! Scimex news feed crawler and story DOI extractor.
//!
//! [Scimex](https://www.scimex.org) publishes science press releases as a
//! paginated feed. Crawling happens in two phases:
//!
//! 1. **Indexing**: walk `{base}/newsfeed?page=0..N` and collect story links
//! 2. **Fetching**: download each story and pull out its headline and DOIs
//!
//! Both phases issue one request at a time with a fixed pause in between.
//! A page or story that fails to download is logged and skipped.

use crate::config::FeedConfig;
use crate::doi::extract_dois;
use crate::fetch::FetchPage;
use crate::models::{StoryPage, UNKNOWN_TITLE};
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::BTreeSet;
use std::error::Error;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Compiled selectors for listing and story pages.
#[derive(Debug, Clone)]
pub struct StorySelectors {
    link: Selector,
    title: Selector,
    content: Option<Selector>,
    body: Selector,
}

impl StorySelectors {
    /// Compile the selectors named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first selector that does not parse.
    pub fn from_config(config: &FeedConfig) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            link: parse_selector(&config.link_selector)?,
            title: parse_selector(&config.title_selector)?,
            content: config
                .content_selector
                .as_deref()
                .map(parse_selector)
                .transpose()?,
            body: parse_selector("body")?,
        })
    }
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector, Box<dyn Error>> {
    Selector::parse(selector).map_err(|e| format!("invalid CSS selector `{selector}`: {e:?}").into())
}

/// URL of one listing page.
pub fn listing_url(base_url: &str, page: u32) -> String {
    format!("{}/newsfeed?page={}", base_url.trim_end_matches('/'), page)
}

/// Collect absolute story links from one listing page.
pub fn parse_story_links(html: &str, base: &Url, selectors: &StorySelectors, prefix: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&selectors.link)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.starts_with(prefix))
        .filter_map(|href| base.join(href).ok())
        .map(|url| url.to_string())
        .collect()
}

/// Crawl `pages` listing pages and return the de-duplicated story links in
/// ascending order.
///
/// # Errors
///
/// Only an unparseable base URL is an error; failed pages contribute nothing.
#[instrument(level = "info", skip(fetcher, config, selectors), fields(base = %config.base_url))]
pub async fn index_story_links<F: FetchPage>(
    fetcher: &F,
    config: &FeedConfig,
    selectors: &StorySelectors,
    pages: u32,
) -> Result<Vec<String>, Box<dyn Error>> {
    let base = Url::parse(&config.base_url)?;
    let mut links = BTreeSet::new();

    for page in 0..pages {
        if page > 0 {
            sleep(config.page_delay()).await;
        }
        let url = listing_url(&config.base_url, page);
        match fetcher.fetch_text(&url, config.page_timeout()).await {
            Ok(html) => {
                let found = parse_story_links(&html, &base, selectors, &config.link_prefix);
                debug!(page, %url, count = found.len(), "Parsed listing page");
                links.extend(found);
            }
            Err(e) => {
                warn!(page, %url, error = %e, "Error fetching listing page; skipping");
            }
        }
    }

    info!(count = links.len(), pages, "Indexed Scimex story URLs");
    Ok(links.into_iter().collect())
}

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Text of `element` as a reader sees it.
///
/// Adjacent text nodes inside inline markup are concatenated, so
/// `10.1000/<em>xyz</em>` stays one DOI. Block-level elements and `<br>`
/// start a new line so neighbouring paragraphs never run together.
fn element_text(element: ElementRef<'_>) -> String {
    let is_block = |node: &Node| node.as_element().is_some_and(|e| BLOCK_TAGS.contains(&e.name()));
    let mut text = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(t) => {
                if node.prev_sibling().is_some_and(|s| is_block(s.value())) {
                    text.push('\n');
                }
                text.push_str(t);
            }
            n if is_block(n) => text.push('\n'),
            _ => {}
        }
    }
    text
}

/// Extract the headline and DOIs from a story page.
pub fn parse_story(html: &str, url: &str, selectors: &StorySelectors) -> StoryPage {
    let document = Html::parse_document(html);

    let title = document
        .select(&selectors.title)
        .next()
        .map(|h| element_text(h).split_whitespace().join(" "))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

    let text = match &selectors.content {
        Some(content) => document.select(content).map(element_text).join("\n"),
        None => document
            .select(&selectors.body)
            .next()
            .map(element_text)
            .unwrap_or_else(|| element_text(document.root_element())),
    };

    StoryPage {
        url: url.to_string(),
        title,
        dois: extract_dois(&text),
    }
}

/// Fetch a single story.
#[instrument(level = "info", skip(fetcher, config, selectors))]
pub async fn fetch_story<F: FetchPage>(
    fetcher: &F,
    url: &str,
    config: &FeedConfig,
    selectors: &StorySelectors,
) -> Result<StoryPage, Box<dyn Error>> {
    let html = fetcher.fetch_text(url, config.story_timeout()).await?;
    let story = parse_story(&html, url, selectors);
    debug!(title = %truncate_for_log(&story.title, 80), dois = story.dois.len(), "Parsed story");
    Ok(story)
}

/// Fetch all stories in order, one at a time.
///
/// Failed fetches are logged and skipped without failing the batch.
#[instrument(level = "info", skip_all, fields(count = urls.len()))]
pub async fn fetch_stories<F: FetchPage>(
    fetcher: &F,
    urls: &[String],
    config: &FeedConfig,
    selectors: &StorySelectors,
) -> Vec<StoryPage> {
    let stories: Vec<StoryPage> = stream::iter(urls.iter().enumerate())
        .then(move |(i, url)| async move {
            if i > 0 {
                sleep(config.story_delay()).await;
            }
            match fetch_story(fetcher, url, config, selectors).await {
                Ok(story) => Some(story),
                Err(e) => {
                    warn!(%url, error = %e, "Error scraping story; skipping");
                    None
                }
            }
        })
        .filter_map(std::future::ready)
        .collect()
        .await;

    info!(count = stories.len(), "Fetched Scimex stories");
    stories
}
