//! Per-site rule sets
//!
//! A site is described entirely by data: where to start, which menu links are
//! catalog categories, which elements are listed items, how pagination signals
//! a next page, where SKUs come from, and one field-extraction function. The
//! crawl engine interprets these rules; it contains no site-specific logic.

use crate::crawler::extract::FieldExtractor;
use crate::ConfigError;
use scraper::Selector;
use std::fmt;

/// Decides which menu links are catalog categories
///
/// Matching is a plain substring test on the raw `href` value, before it is
/// resolved against the page URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    /// Every one of these must appear in the href
    pub require: Vec<String>,

    /// None of these may appear in the href
    pub exclude: Vec<String>,
}

impl CategoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, token: impl Into<String>) -> Self {
        self.require.push(token.into());
        self
    }

    pub fn exclude(mut self, token: impl Into<String>) -> Self {
        self.exclude.push(token.into());
        self
    }

    /// Returns true if `href` should be crawled as a category
    pub fn accepts(&self, href: &str) -> bool {
        self.require.iter().all(|token| href.contains(token.as_str()))
            && !self.exclude.iter().any(|token| href.contains(token.as_str()))
    }
}

/// How categories are discovered on the start page
#[derive(Debug, Clone)]
pub struct CategoryRule {
    /// Selector for candidate anchor elements
    pub link_selector: String,

    /// Inclusion/exclusion predicate on the raw href
    pub filter: CategoryFilter,

    /// Regex whose first capture group is the numeric category id
    ///
    /// When set, links whose URL yields no id are skipped. When unset every
    /// category gets id 0.
    pub id_pattern: Option<String>,
}

/// What marks a pagination link as "next page"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextMarker {
    /// The link's `rel` attribute contains this token
    Rel(String),

    /// The link's text contains this label
    Text(String),
}

/// Where the pagination control lives and how to read it
#[derive(Debug, Clone)]
pub struct PaginationRule {
    /// Selector for the pagination control region
    pub container: String,

    /// Selector for link elements inside the container
    pub links: String,

    /// Predicate identifying the next-page link
    pub next: NextMarker,
}

impl PaginationRule {
    /// Pagination signalled by `rel="next"` on links inside `container`
    pub fn rel_next(container: impl Into<String>, links: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            links: links.into(),
            next: NextMarker::Rel("next".to_string()),
        }
    }

    /// Pagination signalled by a link whose text contains `label`
    pub fn labeled(
        container: impl Into<String>,
        links: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            container: container.into(),
            links: links.into(),
            next: NextMarker::Text(label.into()),
        }
    }
}

/// Where a product's SKU comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkuRule {
    /// The site exposes no SKU
    None,

    /// Filename of an image inside the item fragment
    ImageFilename {
        selector: String,
        attr: String,
        placeholders: Vec<String>,
    },

    /// Labelled text on the product's detail page
    DetailPage {
        selector: String,
        label: String,
        delimiter: char,
    },
}

/// The complete rule set for one site
#[derive(Clone)]
pub struct SiteRules {
    /// Short site name used in logs and reports
    pub name: String,

    /// Page holding the category menu
    pub start_url: String,

    pub categories: CategoryRule,

    /// Selector for one listed item on a category page
    pub item_selector: String,

    pub pagination: PaginationRule,

    pub sku: SkuRule,

    /// Required-field extraction for one item fragment
    pub extract: FieldExtractor,
}

impl SiteRules {
    /// Replaces the start URL
    pub fn with_start_url(mut self, start_url: impl Into<String>) -> Self {
        self.start_url = start_url.into();
        self
    }

    /// Adds category exclusions on top of the built-in ones
    pub fn with_exclusions<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories
            .filter
            .exclude
            .extend(tokens.into_iter().map(Into::into));
        self
    }
}

impl fmt::Debug for SiteRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteRules")
            .field("name", &self.name)
            .field("start_url", &self.start_url)
            .field("categories", &self.categories)
            .field("item_selector", &self.item_selector)
            .field("pagination", &self.pagination)
            .field("sku", &self.sku)
            .finish_non_exhaustive()
    }
}

/// Compiles a CSS selector from a rule set
pub(crate) fn compile_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}
