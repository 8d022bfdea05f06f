//! Superseis and Stock
//!
//! Both chains run the same storefront, so they share one rule set and differ
//! only in their start URL. Category and product ids are embedded in paths
//! (`/category/12-bebidas.aspx`, `/products/345-leche.aspx`). The barcode is
//! only shown on the product detail page.

use crate::crawler::{
    attr, element_text, required_text, select_first, CategoryFilter, CategoryRule, ExtractedItem,
    ItemError, ItemFailure, PaginationRule, SiteRules, SkuRule,
};
use crate::normalize::{capture_id, parse_price, GUARANI};
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

pub(super) const SUPERSEIS_START_URL: &str = "http://www.superseis.com.py/default.aspx";
pub(super) const STOCK_START_URL: &str = "http://www.stock.com.py/default.aspx";

const CATEGORY_ID_PATTERN: &str = r"/category/(\d+)-";

static PRODUCT_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/products/(\d+)-").unwrap());
static PRICE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".price-label").unwrap());
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".product-title a").unwrap());
static LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".product-title-link").unwrap());

pub(super) fn rules(name: &str, start_url: &str) -> SiteRules {
    SiteRules {
        name: name.to_string(),
        start_url: start_url.to_string(),
        categories: CategoryRule {
            link_selector: "a".to_string(),
            filter: CategoryFilter::new().require("/category/"),
            id_pattern: Some(CATEGORY_ID_PATTERN.to_string()),
        },
        item_selector: ".product-item".to_string(),
        pagination: PaginationRule::labeled(".product-pager-box", "a", "Siguiente"),
        sku: SkuRule::DetailPage {
            selector: ".sku".to_string(),
            label: "Código de Barras".to_string(),
            delimiter: ':',
        },
        extract,
    }
}

fn extract(item: ElementRef<'_>) -> Result<ExtractedItem, ItemFailure> {
    let link = select_first(item, &LINK, "product link")?;
    let href = attr(link, "href")?;
    let id = capture_id(&PRODUCT_ID, href).ok_or_else(|| ItemError::UnparseableId(href.to_string()))?;

    let name = select_first(item, &TITLE, "title")
        .and_then(|title| required_text(title, "title"))
        .map_err(|e| ItemFailure::from(e).with_id(id))?;

    let failed = |e: ItemError| ItemFailure::from(e).with_id(id).with_title(name.clone());

    let price_element = select_first(item, &PRICE, "price").map_err(failed)?;
    let price = parse_price(&element_text(price_element), &GUARANI)
        .map_err(|e| failed(e.into()))?;

    Ok(ExtractedItem {
        id,
        name,
        href: href.to_string(),
        price,
        category_id: None,
    })
}
