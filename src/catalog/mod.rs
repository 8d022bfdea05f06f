//! Catalog data model
//!
//! This module defines the records produced by a crawl and the per-run state
//! the crawl engine keeps while producing them.
//!
//! # Components
//!
//! - `Product`: the normalized output record
//! - `Category`: a listing discovered from a site's navigation menu
//! - `Deduplicator`: tracks product ids already emitted within one run
//! - `CrawlState`: everything the engine owns for the duration of a run

mod dedup;
mod product;
mod state;

pub use dedup::Deduplicator;
pub use product::{Category, Product};
pub use state::{CategoryIndex, CrawlState};
