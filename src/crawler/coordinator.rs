//! Crawl engine - category and pagination orchestration
//!
//! This module contains the crawl loop shared by every site:
//! - Opening the start page and discovering categories
//! - Paginating each category until its pagination control is exhausted
//! - Running the site's field extractor on every listed item
//! - Dropping repeated product ids and resolving SKUs
//! - Streaming accepted products to the caller, in discovery order
//!
//! The loop is strictly sequential. The document provider is the only
//! suspension point, and nothing here is spawned, so documents never have to
//! cross threads.

use crate::catalog::{Category, CrawlState, Product};
use crate::config::CategoryErrorPolicy;
use crate::crawler::discovery::CategoryDiscovery;
use crate::crawler::extract::{FieldExtractor, ItemError, ItemFailure};
use crate::crawler::pagination::{Navigator, PageCursor};
use crate::crawler::provider::{Document, DocumentProvider};
use crate::crawler::rules::{compile_selector, SiteRules};
use crate::crawler::sku::SkuResolver;
use crate::normalize::resolve_url;
use crate::output::{CategoryFailure, CrawlReport, OutputError, SkipDiagnostic};
use crate::{CatalogError, ConfigError};
use scraper::{ElementRef, Selector};
use std::collections::HashSet;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// How a category ended
enum CategoryOutcome {
    /// Paginated until exhausted
    Completed { pages: usize },

    /// Stopped on a cancellation request
    Cancelled,
}

/// Crawl engine for one site
///
/// All selectors and patterns of the rule set are compiled when the crawler
/// is built, so a broken rule set fails before any page is requested.
pub struct Crawler<'a, P: DocumentProvider> {
    provider: &'a P,
    site: String,
    start_url: Url,
    discovery: CategoryDiscovery,
    items: Selector,
    navigator: Navigator,
    sku: SkuResolver,
    extract: FieldExtractor,
    policy: CategoryErrorPolicy,
    cancel: CancellationToken,
}

impl<'a, P: DocumentProvider> Crawler<'a, P> {
    /// Creates a crawler for a site rule set
    ///
    /// # Arguments
    ///
    /// * `provider` - Source of documents for every fetch of the run
    /// * `rules` - The site's rule set
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Every selector and pattern compiled
    /// * `Err(ConfigError)` - The rule set is invalid
    pub fn new(provider: &'a P, rules: &SiteRules) -> Result<Self, ConfigError> {
        let start_url = Url::parse(&rules.start_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", rules.start_url, e)))?;

        Ok(Self {
            provider,
            site: rules.name.clone(),
            start_url,
            discovery: CategoryDiscovery::new(&rules.categories)?,
            items: compile_selector(&rules.item_selector)?,
            navigator: Navigator::new(&rules.pagination)?,
            sku: SkuResolver::new(&rules.sku)?,
            extract: rules.extract,
            policy: CategoryErrorPolicy::default(),
            cancel: CancellationToken::new(),
        })
    }

    /// Sets what happens when a category page cannot be opened
    pub fn with_policy(mut self, policy: CategoryErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Stops the run early once `cancel` is triggered
    ///
    /// The token is checked before each category and before each page fetch.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Runs the crawl, passing every accepted product to `on_product`
    ///
    /// Products arrive in category order, then page order, then in-page
    /// element order. An error returned by `on_product` ends the run.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - All categories processed, or the run was cancelled
    /// * `Err(CatalogError)` - Start page failure, aborted category or output failure
    pub async fn run<F>(&self, mut on_product: F) -> Result<CrawlReport, CatalogError>
    where
        F: FnMut(Product) -> Result<(), OutputError>,
    {
        let started = Instant::now();
        let mut state = CrawlState::new();
        let mut report = CrawlReport::new(&self.site);

        tracing::info!("Starting {} crawl at {}", self.site, self.start_url);

        let start_page =
            self.provider
                .open(&self.start_url)
                .await
                .map_err(|source| CatalogError::StartPage {
                    url: self.start_url.to_string(),
                    source,
                })?;
        report.pages_fetched += 1;

        let categories = self.discovery.discover(&start_page, &mut state.categories);
        drop(start_page);

        report.categories_discovered = categories.len();
        tracing::info!("Discovered {} categories", categories.len());

        for (index, category) in categories.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::warn!(
                    "Crawl cancelled with {} of {} categories remaining",
                    categories.len() - index,
                    categories.len()
                );
                report.cancelled = true;
                break;
            }

            tracing::info!(
                "Category {}/{}: {}",
                index + 1,
                categories.len(),
                category
            );
            state.enter_category(category);

            let outcome = self
                .crawl_category(category, &mut state, &mut report, &mut on_product)
                .await;
            state.leave_category();

            match outcome {
                Ok(CategoryOutcome::Completed { pages }) => {
                    report.categories_completed += 1;
                    tracing::info!(
                        "Finished {} ({} pages, {} products so far)",
                        category,
                        pages,
                        report.products_emitted
                    );
                }
                Ok(CategoryOutcome::Cancelled) => {
                    tracing::warn!("Crawl cancelled while paginating {}", category);
                    report.cancelled = true;
                    break;
                }
                Err((
                    pages_completed,
                    CatalogError::CategoryFetch {
                        category_url,
                        page_url,
                        source,
                    },
                )) if self.policy == CategoryErrorPolicy::Skip => {
                    tracing::error!(
                        "Abandoning category {} at {}: {}",
                        category_url,
                        page_url,
                        source
                    );
                    report.failed_categories.push(CategoryFailure {
                        category_url,
                        page_url,
                        pages_completed,
                        message: source.to_string(),
                    });
                }
                Err((_, e)) => {
                    tracing::error!("Crawl stopped in {}: {}", category, e);
                    return Err(e);
                }
            }
        }

        report.elapsed = started.elapsed();
        tracing::info!(
            "Crawl of {} finished: {} products, {} skipped, {} duplicates, {} pages in {:.1}s",
            self.site,
            report.products_emitted,
            report.skipped_count(),
            report.duplicates_dropped,
            report.pages_fetched,
            report.elapsed.as_secs_f64()
        );

        Ok(report)
    }

    /// Paginates one category
    ///
    /// On error, also returns how many pages were completed before it.
    async fn crawl_category<F>(
        &self,
        category: &Category,
        state: &mut CrawlState,
        report: &mut CrawlReport,
        on_product: &mut F,
    ) -> Result<CategoryOutcome, (usize, CatalogError)>
    where
        F: FnMut(Product) -> Result<(), OutputError>,
    {
        let mut visited: HashSet<Url> = HashSet::new();
        let mut pages = 0;
        let mut cursor = PageCursor::start(category.url.clone());

        while let PageCursor::Fetching(page_url) = cursor {
            if self.cancel.is_cancelled() {
                return Ok(CategoryOutcome::Cancelled);
            }

            visited.insert(page_url.clone());
            state.current_page = Some(page_url.clone());

            let page = match self.provider.open(&page_url).await {
                Ok(page) => page,
                Err(source) => {
                    return Err((
                        pages,
                        CatalogError::CategoryFetch {
                            category_url: category.url.to_string(),
                            page_url: page_url.to_string(),
                            source,
                        },
                    ))
                }
            };
            report.pages_fetched += 1;
            pages += 1;
            tracing::debug!("Fetched page {} of {}: {}", pages, category, page.url);

            self.process_page(&page, category, state, report, on_product)
                .await
                .map_err(|e| (pages, e))?;

            cursor = match self.navigator.inspect(&page) {
                PageCursor::HasNext(next) if visited.contains(&next) => {
                    tracing::warn!(
                        "Next page {} of {} was already visited; stopping pagination",
                        next,
                        category
                    );
                    PageCursor::Exhausted
                }
                other => other,
            }
            .advance();
        }

        Ok(CategoryOutcome::Completed { pages })
    }

    /// Extracts, filters and emits every item listed on one page
    async fn process_page<F>(
        &self,
        page: &Document,
        category: &Category,
        state: &mut CrawlState,
        report: &mut CrawlReport,
        on_product: &mut F,
    ) -> Result<(), CatalogError>
    where
        F: FnMut(Product) -> Result<(), OutputError>,
    {
        for item in page.html.select(&self.items) {
            let extracted = match (self.extract)(item) {
                Ok(extracted) => extracted,
                Err(failure) => {
                    record_skip(report, category, &page.url, failure);
                    continue;
                }
            };

            let Some(url) = resolve_url(&page.url, &extracted.href) else {
                let failure = ItemFailure::from(ItemError::UnresolvableUrl(extracted.href))
                    .with_id(extracted.id)
                    .with_title(extracted.name);
                record_skip(report, category, &page.url, failure);
                continue;
            };

            if !state.dedup.admit(extracted.id) {
                tracing::trace!("Dropping repeated product {} on {}", extracted.id, page.url);
                report.duplicates_dropped += 1;
                continue;
            }

            let sku = self.resolve_sku(item, extracted.id, &url, report).await;

            let product = Product {
                id: extracted.id,
                name: extracted.name,
                url: url.to_string(),
                price: extracted.price.amount,
                category_id: extracted.category_id.unwrap_or(category.id),
                category_url: category.url.to_string(),
                per_kilogram: extracted.price.per_kilogram,
                sku,
            };

            on_product(product)?;
            report.products_emitted += 1;
        }

        Ok(())
    }

    /// Looks up a product's SKU, falling back to an empty one
    async fn resolve_sku(
        &self,
        item: ElementRef<'_>,
        product_id: i64,
        product_url: &Url,
        report: &mut CrawlReport,
    ) -> String {
        let resolved = match &self.sku {
            SkuResolver::None => return String::new(),
            SkuResolver::ImageFilename { .. } => self.sku.from_fragment(item),
            SkuResolver::DetailPage { .. } => match self.provider.open(product_url).await {
                Ok(detail) => {
                    report.detail_pages_fetched += 1;
                    self.sku.from_detail(&detail)
                }
                Err(e) => Err(ItemError::MissingSku(format!(
                    "detail page unavailable: {}",
                    e
                ))),
            },
        };

        match resolved {
            Ok(sku) => sku,
            Err(e) => {
                tracing::warn!("Product {} ({}): {}; using empty SKU", product_id, product_url, e);
                report.sku_unavailable += 1;
                String::new()
            }
        }
    }
}

/// Logs a skipped item and records its diagnostic
fn record_skip(report: &mut CrawlReport, category: &Category, page_url: &Url, failure: ItemFailure) {
    tracing::warn!(
        "Skipping item in {} on {}: {}",
        category.url,
        page_url,
        failure
    );

    report.skipped.push(SkipDiagnostic {
        category_url: category.url.to_string(),
        page_url: page_url.to_string(),
        product_id: failure.product_id,
        title: failure.title,
        reason: failure.error,
    });
}

/// Crawls a site with the default category policy and no cancellation
///
/// # Arguments
///
/// * `provider` - Source of documents
/// * `rules` - The site's rule set
/// * `on_product` - Receives every accepted product, in discovery order
pub async fn crawl<P, F>(
    provider: &P,
    rules: &SiteRules,
    on_product: F,
) -> Result<CrawlReport, CatalogError>
where
    P: DocumentProvider,
    F: FnMut(Product) -> Result<(), OutputError>,
{
    Crawler::new(provider, rules)?.run(on_product).await
}
