//! Arete (www.arete.com.py)
//!
//! Categories come from the `#dl-menu` navigation and carry no numeric id.
//! Product ids live on the "buy" button, SKUs in the product image filename.

use crate::crawler::{
    attr, element_text, required_text, select_first, CategoryFilter, CategoryRule, ExtractedItem,
    ItemError, ItemFailure, PaginationRule, SiteRules, SkuRule,
};
use crate::normalize::{parse_id, parse_price, GUARANI};
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

pub(super) const START_URL: &str = "https://www.arete.com.py/";

static PRICE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".price-product:not(.price-discount)").unwrap());
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".desc-product a").unwrap());
static BUY: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".buy").unwrap());

pub(super) fn rules() -> SiteRules {
    SiteRules {
        name: "arete".to_string(),
        start_url: START_URL.to_string(),
        categories: CategoryRule {
            link_selector: "#dl-menu a".to_string(),
            filter: CategoryFilter::new()
                .require("https://")
                .exclude("ofertas")
                .exclude("novedades"),
            id_pattern: None,
        },
        item_selector: ".item".to_string(),
        pagination: PaginationRule::rel_next(".pagination", "li a"),
        sku: SkuRule::ImageFilename {
            selector: ".imgproduct img".to_string(),
            attr: "src".to_string(),
            placeholders: vec!["default".to_string()],
        },
        extract,
    }
}

fn extract(item: ElementRef<'_>) -> Result<ExtractedItem, ItemFailure> {
    let buy = select_first(item, &BUY, "buy button")?;
    let raw_id = attr(buy, "data-id")?;
    let id = parse_id(raw_id).ok_or_else(|| ItemError::UnparseableId(raw_id.to_string()))?;

    let title = select_first(item, &TITLE, "title").map_err(|e| ItemFailure::from(e).with_id(id))?;
    let name = required_text(title, "title").map_err(|e| ItemFailure::from(e).with_id(id))?;

    let failed = |e: ItemError| ItemFailure::from(e).with_id(id).with_title(name.clone());

    let href = attr(title, "href").map_err(failed)?.to_string();
    let price_element = select_first(item, &PRICE, "price").map_err(failed)?;
    let price = parse_price(&element_text(price_element), &GUARANI)
        .map_err(|e| failed(e.into()))?;

    Ok(ExtractedItem {
        id,
        name,
        href,
        price,
        category_id: None,
    })
}
