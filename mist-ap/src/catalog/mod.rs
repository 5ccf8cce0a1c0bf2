//! Catalog client
//!
//! Scrapes the sound catalog site for search results, category listings,
//! trending and all-time-best pages, and per-sound detail pages. The site
//! has no API; pages are fetched with plain GET requests and scanned with
//! the patterns in [`parser`].

pub mod parser;

use reqwest::{StatusCode, Url};
use tracing::debug;

use crate::error::{Error, Result};

/// Categories offered by the catalog
pub const CATEGORIES: &[&str] = &[
    "anime & manga",
    "games",
    "memes",
    "movies",
    "music",
    "politics",
    "pranks",
    "reactions",
    "sound effects",
    "sports",
    "television",
    "tiktok trends",
    "viral",
    "whatsapp audios",
];

/// One sound as listed by the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundEntry {
    pub slug: String,
    pub name: String,
    pub url: String,
}

/// Detail page information for one sound
#[derive(Debug, Clone, PartialEq)]
pub struct SoundDetails {
    pub slug: String,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    /// Filled in by the duration estimator when extended details are on
    pub duration_secs: Option<f64>,
}

/// Canonical category name for user input, matched case-insensitively
pub fn match_category(input: &str) -> Option<&'static str> {
    let input = input.trim();
    CATEGORIES
        .iter()
        .copied()
        .find(|c| c.eq_ignore_ascii_case(input))
}

/// HTTP client for the catalog site
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL for `segments` below the base, with a trailing slash
    fn page_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Catalog(format!("invalid catalog URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Catalog(format!("catalog URL {} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    /// Page body, or `None` when the page does not exist
    async fn fetch_page(&self, url: Url) -> Result<Option<String>> {
        debug!(url = %url, "Fetching catalog page");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(Some(response.text().await?))
    }

    async fn fetch_listing(&self, url: Url) -> Result<Vec<SoundEntry>> {
        let results = match self.fetch_page(url).await? {
            Some(html) => parser::parse_results(&html, &self.base_url),
            None => Vec::new(),
        };
        debug!("Catalog listing returned {} sounds", results.len());
        Ok(results)
    }

    /// Sounds matching a free-text query
    pub async fn search(&self, query: &str) -> Result<Vec<SoundEntry>> {
        let mut url = self.page_url(&["en", "search"])?;
        url.query_pairs_mut().append_pair("name", query);
        self.fetch_listing(url).await
    }

    /// Sounds in a category (name used as given)
    pub async fn category(&self, name: &str) -> Result<Vec<SoundEntry>> {
        let url = self.page_url(&["en", "categories", name])?;
        self.fetch_listing(url).await
    }

    /// Currently trending sounds (US index)
    pub async fn trending(&self) -> Result<Vec<SoundEntry>> {
        let url = self.page_url(&["en", "index", "us"])?;
        self.fetch_listing(url).await
    }

    pub async fn best_of_all_time(&self) -> Result<Vec<SoundEntry>> {
        let url = self.page_url(&["en", "best_of_all_time"])?;
        self.fetch_listing(url).await
    }

    /// Details for `slug`, or `None` when the sound has no page
    pub async fn details(&self, slug: &str) -> Result<Option<SoundDetails>> {
        let url = self.page_url(&["en", "instant", slug])?;
        Ok(self
            .fetch_page(url)
            .await?
            .and_then(|html| parser::parse_details(&html, slug, &self.base_url)))
    }
}
