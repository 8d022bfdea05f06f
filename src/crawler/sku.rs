//! SKU resolution
//!
//! Compiled form of a site's [`SkuRule`]. A failed lookup is reported as
//! [`ItemError::MissingSku`]; the engine turns that into an empty SKU rather
//! than dropping the product.

use crate::crawler::extract::{select_first, ItemError};
use crate::crawler::provider::Document;
use crate::crawler::rules::{compile_selector, SkuRule};
use crate::normalize::{sku_from_image_path, sku_from_labeled_text};
use crate::ConfigError;
use scraper::{ElementRef, Selector};

#[derive(Debug, Clone)]
pub enum SkuResolver {
    None,

    ImageFilename {
        selector: Selector,
        attr: String,
        placeholders: Vec<String>,
    },

    DetailPage {
        selector: Selector,
        label: String,
        delimiter: char,
    },
}

impl SkuResolver {
    pub fn new(rule: &SkuRule) -> Result<Self, ConfigError> {
        Ok(match rule {
            SkuRule::None => Self::None,
            SkuRule::ImageFilename {
                selector,
                attr,
                placeholders,
            } => Self::ImageFilename {
                selector: compile_selector(selector)?,
                attr: attr.clone(),
                placeholders: placeholders.clone(),
            },
            SkuRule::DetailPage {
                selector,
                label,
                delimiter,
            } => Self::DetailPage {
                selector: compile_selector(selector)?,
                label: label.clone(),
                delimiter: *delimiter,
            },
        })
    }

    /// Returns true if resolving a SKU costs one extra fetch per product
    pub fn needs_detail_page(&self) -> bool {
        matches!(self, Self::DetailPage { .. })
    }

    /// Reads the SKU from the listed item itself
    ///
    /// Only image-based rules read anything here; the other rules yield an
    /// empty SKU.
    pub fn from_fragment(&self, item: ElementRef<'_>) -> Result<String, ItemError> {
        let Self::ImageFilename {
            selector,
            attr: attr_name,
            placeholders,
        } = self
        else {
            return Ok(String::new());
        };

        let image = select_first(item, selector, "sku image")
            .map_err(|e| ItemError::MissingSku(e.to_string()))?;
        let path = image
            .value()
            .attr(attr_name)
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .ok_or_else(|| ItemError::MissingSku(format!("image has no {}", attr_name)))?;

        sku_from_image_path(path, placeholders).map_err(|e| ItemError::MissingSku(e.to_string()))
    }

    /// Reads the SKU from a product detail page
    pub fn from_detail(&self, page: &Document) -> Result<String, ItemError> {
        let Self::DetailPage {
            selector,
            label,
            delimiter,
        } = self
        else {
            return Ok(String::new());
        };

        let mut found = false;
        for element in page.html.select(selector) {
            found = true;
            let text: String = element.text().collect();
            if text.contains(label.as_str()) {
                return sku_from_labeled_text(&text, label, *delimiter)
                    .map_err(|e| ItemError::MissingSku(e.to_string()));
            }
        }

        if found {
            Err(ItemError::MissingSku(format!(
                "label '{}' not found on {}",
                label, page.url
            )))
        } else {
            Err(ItemError::MissingSku(format!(
                "no SKU element on {}",
                page.url
            )))
        }
    }
}
