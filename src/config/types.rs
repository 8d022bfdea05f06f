use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// Main configuration structure for the catalog crawler
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub crawler: CrawlerConfig,

    #[serde(default)]
    pub output: OutputConfig,

    /// Per-site overrides keyed by site id (`s6`, `stock`, `casarica`, `arete`)
    #[serde(default)]
    pub sites: HashMap<String, SiteOverride>,
}

impl Config {
    /// Returns the override section for a site, if any
    pub fn site_override(&self, key: &str) -> Option<&SiteOverride> {
        self.sites.get(key)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

fn default_crawler_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Total request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// What the engine does when a category page cannot be opened
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryErrorPolicy {
    /// Record the failure, abandon the category and continue with the next one
    #[default]
    Skip,

    /// Stop the whole run
    Abort,
}

impl fmt::Display for CategoryErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrawlerConfig {
    #[serde(rename = "on-category-error", default)]
    pub on_category_error: CategoryErrorPolicy,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file; no database is written when unset
    #[serde(rename = "sqlite-path", default)]
    pub sqlite_path: Option<String>,

    /// Path to the markdown report file; no report is written when unset
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

/// Overrides for one built-in site
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteOverride {
    /// Replaces the built-in start URL
    #[serde(rename = "start-url", default)]
    pub start_url: Option<String>,

    /// Category href substrings to skip, added to the built-in exclusions
    #[serde(default)]
    pub exclude: Vec<String>,
}
