//! Catalog Crawler: a product catalog extractor for e-commerce sites
//!
//! This crate walks a shop's category menu, paginates every category listing,
//! extracts one normalized [`Product`] per listed item and streams the results
//! to a caller-supplied callback. Each supported site contributes only a small
//! rule set (selectors and a field extractor); traversal, error policy and the
//! output contract are shared.

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod normalize;
pub mod output;
pub mod sites;

use thiserror::Error;

/// Main error type for catalog crawl operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to open start page {url}: {source}")]
    StartPage {
        url: String,
        source: crawler::FetchError,
    },

    #[error("Failed to open page {page_url} of category {category_url}: {source}")]
    CategoryFetch {
        category_url: String,
        page_url: String,
        source: crawler::FetchError,
    },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid id pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid CSS selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Unknown site '{0}' (expected one of: s6, stock, casarica, arete)")]
    UnknownSite(String),
}

/// Result type alias for catalog crawl operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{Category, Product};
pub use config::Config;
pub use crawler::{crawl, Crawler, DocumentProvider};
pub use sites::SiteId;
