//! Text normalization for scraped catalog fields
//!
//! This module turns the loosely formatted strings found in listing markup into
//! typed values: prices (currency tokens, thousands separators, per-kilogram
//! markers), SKUs (image filenames or labelled text), numeric ids and absolute
//! URLs.

mod price;
mod resolve;
mod sku;

pub use price::{parse_price, Price, PriceError, PriceFormat, GUARANI};
pub use resolve::resolve_url;
pub use sku::{sku_from_image_path, sku_from_labeled_text, SkuError};

use regex::Regex;

/// Collapses every run of whitespace into a single space and trims the ends
///
/// # Example
///
/// ```
/// use catalog_crawler::normalize::clean_text;
///
/// assert_eq!(clean_text("  Leche\n   entera  1L "), "Leche entera 1L");
/// ```
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses a trimmed, strictly numeric identifier
///
/// Returns `None` for empty input, signs, or any non-digit character.
pub fn parse_id(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

/// Extracts a numeric id from the first capture group of `pattern`
///
/// Mirrors how the retail sites embed ids in paths such as
/// `/products/1234-leche-entera`. The pattern must match exactly once;
/// ambiguous input yields `None`.
pub fn capture_id(pattern: &Regex, text: &str) -> Option<i64> {
    let mut matches = pattern.captures_iter(text);
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    parse_id(first.get(1)?.as_str())
}
