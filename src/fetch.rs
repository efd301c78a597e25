//! HTTP page fetching behind a small async trait.
//!
//! Every remote read the application performs (the Retraction Watch CSV, the
//! Scimex listing pages, individual stories, and the page scanned by the
//! query builder) goes through [`FetchPage`]. The production implementation is
//! [`HttpFetcher`], a thin wrapper around a shared `reqwest::Client`.
//!
//! # Timeouts
//!
//! Timeouts are chosen per call site and passed with each request rather than
//! baked into the client, since the registry download is much slower than a
//! single story page.
//!
//! # Retries
//!
//! There are none. A failed request is returned to the caller, which decides
//! whether the failure is fatal (registry) or only skips one item (pages).

use reqwest::Client;
use std::error::Error;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Trait for fetching a URL as text.
///
/// Implementors return the decoded response body, or an error for transport
/// failures and non-success HTTP statuses.
pub trait FetchPage {
    /// Fetch `url`, giving up after `timeout`.
    async fn fetch_text(&self, url: &str, timeout: Duration) -> Result<String, Box<dyn Error>>;
}

/// [`FetchPage`] implementation backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher with the crate's user agent.
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        Ok(Self { client })
    }
}

impl FetchPage for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch_text(&self, url: &str, timeout: Duration) -> Result<String, Box<dyn Error>> {
        let t0 = Instant::now();
        let res = async {
            let resp = self
                .client
                .get(url)
                .timeout(timeout)
                .send()
                .await?
                .error_for_status()?;
            Ok::<String, reqwest::Error>(resp.text().await?)
        }
        .await;
        let dt = t0.elapsed();

        match res {
            Ok(body) => {
                debug!(elapsed_ms = dt.as_millis() as u64, bytes = body.len(), "GET succeeded");
                Ok(body)
            }
            Err(e) => {
                warn!(elapsed_ms = dt.as_millis() as u64, error = %e, "GET failed");
                Err(Box::new(e))
            }
        }
    }
}

/// In-memory fetcher for tests.
///
/// URLs registered with [`StaticFetcher::page`] return their body; URLs
/// registered with [`StaticFetcher::failing`] or not registered at all return
/// an error. Every requested URL is recorded in order.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: std::collections::HashMap<String, Result<String, String>>,
    requested: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    pub fn failing(mut self, url: &str, message: &str) -> Self {
        self.pages.insert(url.to_string(), Err(message.to_string()));
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

#[cfg(test)]
impl FetchPage for StaticFetcher {
    async fn fetch_text(&self, url: &str, _timeout: Duration) -> Result<String, Box<dyn Error>> {
        self.requested.borrow_mut().push(url.to_string());
        match self.pages.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(message)) => Err(message.clone().into()),
            None => Err(format!("no page registered for {url}").into()),
        }
    }
}
