//! Crawl report
//!
//! The engine fills a [`CrawlReport`] as it goes and returns it when the run
//! ends. Besides the counters it keeps one [`SkipDiagnostic`] per skipped item
//! and one [`CategoryFailure`] per abandoned category, so data completeness can
//! be audited after the fact.

use crate::crawler::ItemError;
use std::time::Duration;

/// One item that was skipped because a required field could not be extracted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipDiagnostic {
    /// Category listing the item was found under
    pub category_url: String,

    /// Listing page the item was found on
    pub page_url: String,

    /// Product id, if it was read before the failure
    pub product_id: Option<i64>,

    /// Product title, if it was read before the failure
    pub title: Option<String>,

    pub reason: ItemError,
}

/// A category whose pagination was abandoned after a fetch failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFailure {
    pub category_url: String,

    /// Page that could not be opened
    pub page_url: String,

    /// Pages of this category processed before the failure
    pub pages_completed: usize,

    pub message: String,
}

/// Outcome of one crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Site name from the rule set
    pub site: String,

    pub categories_discovered: usize,

    /// Categories paginated until exhausted
    pub categories_completed: usize,

    pub failed_categories: Vec<CategoryFailure>,

    /// Listing pages fetched, including the start page
    pub pages_fetched: usize,

    /// Product detail pages fetched for SKU lookup
    pub detail_pages_fetched: usize,

    pub products_emitted: usize,

    /// Items dropped because their id was already emitted
    pub duplicates_dropped: usize,

    pub skipped: Vec<SkipDiagnostic>,

    /// Products emitted with an empty SKU after a lookup failure
    pub sku_unavailable: usize,

    /// True if the run stopped early on a cancellation request
    pub cancelled: bool,

    pub elapsed: Duration,
}

impl CrawlReport {
    pub fn new(site: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            ..Self::default()
        }
    }

    /// Number of items skipped with a diagnostic
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Returns true if every discovered category was paginated to the end
    pub fn is_complete(&self) -> bool {
        !self.cancelled
            && self.failed_categories.is_empty()
            && self.categories_completed == self.categories_discovered
    }

    /// Share of listed items that became products, as a percentage
    ///
    /// Duplicates are not counted as listed items.
    pub fn yield_rate(&self) -> f64 {
        let listed = self.products_emitted + self.skipped.len();
        if listed == 0 {
            return 0.0;
        }
        (self.products_emitted as f64 / listed as f64) * 100.0
    }
}

/// Prints a crawl report to stdout in a formatted manner
///
/// # Arguments
///
/// * `report` - The report returned by the crawl engine
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report: {} ===\n", report.site);

    println!("Overview:");
    println!(
        "  Categories: {} discovered, {} completed, {} failed",
        report.categories_discovered,
        report.categories_completed,
        report.failed_categories.len()
    );
    println!(
        "  Pages fetched: {} listing, {} detail",
        report.pages_fetched, report.detail_pages_fetched
    );
    println!("  Products emitted: {}", report.products_emitted);
    println!("  Duplicates dropped: {}", report.duplicates_dropped);
    println!("  Items skipped: {}", report.skipped_count());
    println!("  Empty SKU after lookup failure: {}", report.sku_unavailable);
    println!("  Elapsed: {:.1}s", report.elapsed.as_secs_f64());
    println!();

    if !report.failed_categories.is_empty() {
        println!("Failed Categories:");
        for failure in &report.failed_categories {
            println!(
                "  - {} (after {} pages): {}",
                failure.category_url, failure.pages_completed, failure.message
            );
        }
        println!();
    }

    if !report.skipped.is_empty() {
        println!("Skipped Items:");
        for skip in report.skipped.iter().take(20) {
            let id = skip
                .product_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("  - [{}] {}: {}", id, skip.page_url, skip.reason);
        }
        if report.skipped.len() > 20 {
            println!("  ... and {} more", report.skipped.len() - 20);
        }
        println!();
    }

    if report.cancelled {
        println!("Run was cancelled before all categories were crawled.");
    }

    println!(
        "Yield: {:.1}% ({} / {} listed items emitted)",
        report.yield_rate(),
        report.products_emitted,
        report.products_emitted + report.skipped_count()
    );
}
