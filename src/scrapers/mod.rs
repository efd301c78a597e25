//! Site scrapers.
//!
//! Each scraper follows the same two-phase pattern:
//!
//! 1. **Indexing**: discover article URLs from a listing
//! 2. **Fetching**: download and parse each article
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Scimex | [`scimex`] | HTML scraping | Paginated `/newsfeed`, DOIs from story text |
//!
//! Requests are made one at a time with a fixed delay between them. Failed
//! fetches are logged and skipped.

pub mod scimex;
