//! Casa Rica (www.casarica.com.py)
//!
//! Listings quote produce per kilogram (`3.200 Gs. el kg.`). The site exposes
//! no SKU.

use crate::crawler::{
    attr, element_text, required_text, select_first, CategoryFilter, CategoryRule, ExtractedItem,
    ItemError, ItemFailure, PaginationRule, SiteRules, SkuRule,
};
use crate::normalize::{parse_id, parse_price, GUARANI};
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

pub(super) const START_URL: &str = "https://www.casarica.com.py/";

static PRODUCT_ID: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".productsListId").unwrap());
static SUBTITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".psubtitle").unwrap());
static PRICE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".pprice").unwrap());
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".pimg a").unwrap());

pub(super) fn rules() -> SiteRules {
    SiteRules {
        name: "casarica".to_string(),
        start_url: START_URL.to_string(),
        categories: CategoryRule {
            link_selector: "#sideNavbar a".to_string(),
            filter: CategoryFilter::new()
                .require("https://")
                .exclude("promociones"),
            id_pattern: None,
        },
        item_selector: ".divproduct".to_string(),
        pagination: PaginationRule::rel_next(".pagination", "li a"),
        sku: SkuRule::None,
        extract,
    }
}

fn extract(item: ElementRef<'_>) -> Result<ExtractedItem, ItemFailure> {
    let id_input = select_first(item, &PRODUCT_ID, "product id")?;
    let raw_id = attr(id_input, "value")?;
    let id = parse_id(raw_id).ok_or_else(|| ItemError::UnparseableId(raw_id.to_string()))?;

    let name = select_first(item, &SUBTITLE, "subtitle")
        .and_then(|subtitle| required_text(subtitle, "subtitle"))
        .map_err(|e| ItemFailure::from(e).with_id(id))?;

    let failed = |e: ItemError| ItemFailure::from(e).with_id(id).with_title(name.clone());

    let price_element = select_first(item, &PRICE, "price").map_err(failed)?;
    let price = parse_price(&element_text(price_element), &GUARANI)
        .map_err(|e| failed(e.into()))?;

    let link = select_first(item, &LINK, "product link").map_err(failed)?;
    let href = attr(link, "href").map_err(failed)?.to_string();

    Ok(ExtractedItem {
        id,
        name,
        href,
        price,
        category_id: None,
    })
}
