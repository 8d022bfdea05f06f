//! Output records for the product catalog
//!
//! A `Product` is only built by the crawl engine once every required field has
//! been extracted, so a value of this type is always complete.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// A normalized catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Site-assigned product identifier, unique within one crawl run
    pub id: i64,

    /// Trimmed display name
    pub name: String,

    /// Absolute product URL
    pub url: String,

    /// Price in the smallest unit of the local currency
    pub price: i64,

    /// Numeric category identifier, `0` when the site has no stable scheme
    pub category_id: i64,

    /// URL of the category listing the product was found under
    pub category_url: String,

    /// True if `price` is quoted per kilogram
    pub per_kilogram: bool,

    /// Vendor code, empty when unavailable
    pub sku: String,
}

impl Product {
    /// Serializes the product as a single line of JSON (no trailing newline)
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// A category listing discovered from a navigation menu
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category {
    /// Numeric id, `0` if the site does not expose one
    pub id: i64,

    /// Absolute URL of the first listing page
    pub url: Url,
}

impl Category {
    pub fn new(id: i64, url: Url) -> Self {
        Self { id, url }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.id == 0 {
            write!(f, "{}", self.url)
        } else {
            write!(f, "{} (#{})", self.url, self.id)
        }
    }
}
