//! Document provider contract
//!
//! The crawl engine never talks to the network directly. It asks a
//! [`DocumentProvider`] for the document at a URL and queries the returned
//! [`Document`] with CSS selectors. Any fetching/parsing backend that satisfies
//! this contract can drive a crawl; [`HttpProvider`](super::HttpProvider) is
//! the production one and [`MemoryProvider`] serves fixtures.

use scraper::Html;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;
use url::Url;

/// Errors reported by a document provider
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Expected HTML from {url}, got '{content_type}'")]
    ContentMismatch { url: String, content_type: String },

    #[error("No document available for {url}")]
    NotFound { url: String },
}

/// A fetched, parsed page
#[derive(Debug)]
pub struct Document {
    /// Final URL of the page (after redirects), used as the base for links
    pub url: Url,

    /// Parsed document tree
    pub html: Html,
}

impl Document {
    pub fn new(url: Url, html: Html) -> Self {
        Self { url, html }
    }

    /// Parses an HTML string into a document located at `url`
    pub fn parse(url: Url, body: &str) -> Self {
        Self::new(url, Html::parse_document(body))
    }
}

/// Source of navigable documents
///
/// `open` is the only suspension point of a crawl.
#[allow(async_fn_in_trait)]
pub trait DocumentProvider {
    async fn open(&self, url: &Url) -> Result<Document, FetchError>;
}

/// Serves pages from memory and records every request
///
/// Used to exercise rule sets against fixture markup without a network.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    pages: HashMap<String, String>,
    failures: HashMap<String, u16>,
    requests: Mutex<Vec<Url>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the HTML served for `url`
    pub fn with_page(mut self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(key(url), body.into());
        self
    }

    /// Makes requests for `url` fail with the given HTTP status
    pub fn with_failure(mut self, url: &str, status: u16) -> Self {
        self.failures.insert(key(url), status);
        self
    }

    /// URLs requested so far, in request order
    pub fn requests(&self) -> Vec<Url> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Number of requests served or failed so far
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .map(|requests| requests.len())
            .unwrap_or_default()
    }
}

impl DocumentProvider for MemoryProvider {
    async fn open(&self, url: &Url) -> Result<Document, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.clone());
        }

        let url_key = url.as_str();
        if let Some(status) = self.failures.get(url_key) {
            return Err(FetchError::Status {
                url: url_key.to_string(),
                status: *status,
            });
        }

        match self.pages.get(url_key) {
            Some(body) => Ok(Document::parse(url.clone(), body)),
            None => Err(FetchError::NotFound {
                url: url_key.to_string(),
            }),
        }
    }
}

/// Normalizes fixture keys the same way `Url` serializes requested URLs
fn key(url: &str) -> String {
    Url::parse(url)
        .map(String::from)
        .unwrap_or_else(|_| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    #[tokio::test]
    async fn test_memory_provider_serves_page() {
        let provider =
            MemoryProvider::new().with_page("https://shop.example", "<p class='x'>hola</p>");
        let url = Url::parse("https://shop.example/").unwrap();

        let doc = provider.open(&url).await.unwrap();
        let selector = Selector::parse(".x").unwrap();
        let text: String = doc.html.select(&selector).next().unwrap().text().collect();

        assert_eq!(text, "hola");
        assert_eq!(doc.url, url);
        assert_eq!(provider.request_count(), 1);
    }

    #[tokio::test]
    async fn test_memory_provider_missing_page() {
        let provider = MemoryProvider::new();
        let url = Url::parse("https://shop.example/none").unwrap();

        let err = provider.open(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::NotFound { .. }));
        assert_eq!(provider.requests(), vec![url]);
    }

    #[tokio::test]
    async fn test_memory_provider_failure() {
        let provider = MemoryProvider::new()
            .with_page("https://shop.example/a", "<p></p>")
            .with_failure("https://shop.example/a", 503);
        let url = Url::parse("https://shop.example/a").unwrap();

        let err = provider.open(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
    }
}
