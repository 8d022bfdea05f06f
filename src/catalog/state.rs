//! Per-run crawl state
//!
//! Owned exclusively by the crawl engine and dropped when the run completes.

use crate::catalog::{Category, Deduplicator};
use std::collections::{HashMap, HashSet};
use url::Url;

/// Registry of categories already scheduled in this run
///
/// Menus routinely link the same category from several places (header, side
/// bar, footer). A category is known once either its URL or its non-zero id has
/// been seen.
#[derive(Debug, Default)]
pub struct CategoryIndex {
    urls: HashSet<Url>,
    by_id: HashMap<i64, Url>,
}

impl CategoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a category, returning false if it was already known
    pub fn insert(&mut self, category: &Category) -> bool {
        if self.urls.contains(&category.url) {
            return false;
        }
        if category.id != 0 && self.by_id.contains_key(&category.id) {
            return false;
        }

        self.urls.insert(category.url.clone());
        if category.id != 0 {
            self.by_id.insert(category.id, category.url.clone());
        }
        true
    }

    /// Looks up the URL registered for a numeric category id
    pub fn url_for(&self, id: i64) -> Option<&Url> {
        self.by_id.get(&id)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Everything the engine tracks while a crawl is in progress
#[derive(Debug, Default)]
pub struct CrawlState {
    /// Product ids already emitted
    pub dedup: Deduplicator,

    /// Categories already scheduled
    pub categories: CategoryIndex,

    /// Category currently being paginated
    pub current_category: Option<Category>,

    /// Listing page currently being processed
    pub current_page: Option<Url>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_category(&mut self, category: &Category) {
        self.current_category = Some(category.clone());
        self.current_page = None;
    }

    pub fn leave_category(&mut self) {
        self.current_category = None;
        self.current_page = None;
    }
}
