//! Field extraction contract
//!
//! A field extractor turns one listed item's markup into the required fields of
//! a product (id, name, link, price) or reports exactly why it could not. Item
//! failures are always recovered by the engine: the item is skipped and a
//! diagnostic is recorded.

use crate::normalize::{clean_text, Price, PriceError};
use scraper::{ElementRef, Selector};
use std::fmt;
use thiserror::Error;

/// Why a single item could not be turned into a product
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    #[error("missing element: {0}")]
    MissingElement(&'static str),

    #[error("missing attribute: {0}")]
    MissingAttribute(&'static str),

    #[error("unparseable price: {0}")]
    UnparseablePrice(String),

    #[error("unparseable id: '{0}'")]
    UnparseableId(String),

    #[error("unresolvable product URL: '{0}'")]
    UnresolvableUrl(String),

    #[error("SKU unavailable: {0}")]
    MissingSku(String),
}

impl From<PriceError> for ItemError {
    fn from(err: PriceError) -> Self {
        ItemError::UnparseablePrice(err.to_string())
    }
}

/// An item error plus whatever identifying data was extracted before it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub error: ItemError,
    pub product_id: Option<i64>,
    pub title: Option<String>,
}

impl ItemFailure {
    pub fn with_id(mut self, id: i64) -> Self {
        self.product_id = Some(id);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl From<ItemError> for ItemFailure {
    fn from(error: ItemError) -> Self {
        Self {
            error,
            product_id: None,
            title: None,
        }
    }
}

impl From<PriceError> for ItemFailure {
    fn from(err: PriceError) -> Self {
        ItemError::from(err).into()
    }
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(id) = self.product_id {
            write!(f, " (product {})", id)?;
        }
        if let Some(title) = &self.title {
            write!(f, " ('{}')", title)?;
        }
        Ok(())
    }
}

/// Required fields of one listed item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedItem {
    pub id: i64,

    /// Display name, whitespace-normalized
    pub name: String,

    /// Product link exactly as found in the markup
    pub href: String,

    pub price: Price,

    /// Category id when the item itself carries one
    pub category_id: Option<i64>,
}

/// Per-site extraction of an item fragment
pub type FieldExtractor = fn(ElementRef<'_>) -> Result<ExtractedItem, ItemFailure>;

/// Returns the first element under `scope` matching `selector`
pub fn select_first<'a>(
    scope: ElementRef<'a>,
    selector: &Selector,
    which: &'static str,
) -> Result<ElementRef<'a>, ItemError> {
    scope
        .select(selector)
        .next()
        .ok_or(ItemError::MissingElement(which))
}

/// Returns a trimmed, non-empty attribute value
pub fn attr<'a>(element: ElementRef<'a>, name: &'static str) -> Result<&'a str, ItemError> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(ItemError::MissingAttribute(name))
}

/// Concatenated descendant text with whitespace collapsed
pub fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

/// Element text that must not be empty
pub fn required_text(element: ElementRef<'_>, which: &'static str) -> Result<String, ItemError> {
    let text = element_text(element);
    if text.is_empty() {
        return Err(ItemError::MissingElement(which));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn with_item<R>(html: &str, f: impl FnOnce(ElementRef<'_>) -> R) -> R {
        let fragment = Html::parse_fragment(html);
        let selector = Selector::parse(".item").unwrap();
        let item = fragment.select(&selector).next().unwrap();
        f(item)
    }

    #[test]
    fn test_select_first() {
        let html = r#"<div class="item"><span class="a">1</span><span class="a">2</span></div>"#;
        with_item(html, |item| {
            let sel = Selector::parse(".a").unwrap();
            let first = select_first(item, &sel, "a").unwrap();
            assert_eq!(element_text(first), "1");

            let missing = Selector::parse(".b").unwrap();
            assert_eq!(
                select_first(item, &missing, "b").unwrap_err(),
                ItemError::MissingElement("b")
            );
        });
    }

    #[test]
    fn test_attr() {
        let html = r#"<div class="item" data-id=" 12 " data-empty=""></div>"#;
        with_item(html, |item| {
            assert_eq!(attr(item, "data-id").unwrap(), "12");
            assert_eq!(
                attr(item, "data-empty").unwrap_err(),
                ItemError::MissingAttribute("data-empty")
            );
            assert_eq!(
                attr(item, "href").unwrap_err(),
                ItemError::MissingAttribute("href")
            );
        });
    }

    #[test]
    fn test_element_text_collapses_whitespace() {
        let html = "<div class=\"item\">\n  Leche <b>entera</b>\n  1L </div>";
        with_item(html, |item| {
            assert_eq!(element_text(item), "Leche entera 1L");
        });
    }

    #[test]
    fn test_required_text() {
        with_item(r#"<div class="item">   </div>"#, |item| {
            assert_eq!(
                required_text(item, "title").unwrap_err(),
                ItemError::MissingElement("title")
            );
        });
    }

    #[test]
    fn test_failure_display() {
        let failure = ItemFailure::from(ItemError::UnparseablePrice("price text is empty".into()))
            .with_id(5)
            .with_title("Arroz");
        assert_eq!(
            failure.to_string(),
            "unparseable price: price text is empty (product 5) ('Arroz')"
        );
    }

    #[test]
    fn test_price_error_conversion() {
        let failure: ItemFailure = PriceError::Empty.into();
        assert!(matches!(failure.error, ItemError::UnparseablePrice(_)));
        assert!(failure.product_id.is_none());
    }
}
