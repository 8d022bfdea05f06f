//! Crawler module for catalog traversal
//!
//! This module contains the site-independent crawling logic, including:
//! - The document provider contract and its HTTP implementation
//! - Site rule sets and the field extraction contract
//! - Category discovery and the pagination navigator
//! - The crawl engine that ties them together

mod coordinator;
mod discovery;
mod extract;
mod fetcher;
mod pagination;
mod provider;
mod rules;
mod sku;

pub use coordinator::{crawl, Crawler};
pub use discovery::CategoryDiscovery;
pub use extract::{
    attr, element_text, required_text, select_first, ExtractedItem, FieldExtractor, ItemError,
    ItemFailure,
};
pub use fetcher::{build_http_client, user_agent_string, HttpProvider};
pub use pagination::{Navigator, PageCursor};
pub use provider::{Document, DocumentProvider, FetchError, MemoryProvider};
pub use rules::{
    CategoryFilter, CategoryRule, NextMarker, PaginationRule, SiteRules, SkuRule,
};
pub use sku::SkuResolver;
