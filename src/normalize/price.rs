//! Price string parsing
//!
//! Listing prices arrive as display strings such as `"15.000 Gs."`,
//! `"Gs. 8.500"` or `"3.200 Gs. el kg."`. Parsing strips the currency tokens,
//! the per-kilogram marker and the thousands separators, and requires what is
//! left to be a plain run of digits.

use thiserror::Error;

/// Errors produced while parsing a price string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price text is empty")]
    Empty,

    #[error("price text '{original}' left non-numeric residue '{residue}'")]
    NonNumeric { original: String, residue: String },

    #[error("price '{0}' is out of range")]
    OutOfRange(String),
}

/// A parsed price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price {
    /// Amount in the smallest currency unit
    pub amount: i64,

    /// True if the amount is quoted per kilogram
    pub per_kilogram: bool,
}

/// Locale conventions for a price string
///
/// Markers are matched case-insensitively, in the order given, so longer
/// markers must precede their prefixes (`"gs."` before `"gs"`).
#[derive(Debug, Clone, Copy)]
pub struct PriceFormat {
    /// Currency tokens, stripped wherever they appear
    pub currency_markers: &'static [&'static str],

    /// Tokens flagging a per-kilogram price, stripped after detection
    pub per_kilogram_markers: &'static [&'static str],

    /// Thousands separators (including whitespace)
    pub separators: &'static [char],
}

/// Paraguayan guaraní: `.` groups thousands, no decimals, `Gs.` currency
pub const GUARANI: PriceFormat = PriceFormat {
    currency_markers: &["gs.", "gs", "₲"],
    per_kilogram_markers: &["el kg.", "el kg", "por kg.", "por kg", "/kg", "kg."],
    separators: &['.', ' ', '\u{a0}', '\t', '\n', '\r'],
};

/// Parses a display price into an integer amount
///
/// # Example
///
/// ```
/// use catalog_crawler::normalize::{parse_price, GUARANI};
///
/// let price = parse_price("3.200 Gs. el kg.", &GUARANI).unwrap();
/// assert_eq!(price.amount, 3200);
/// assert!(price.per_kilogram);
/// ```
pub fn parse_price(text: &str, format: &PriceFormat) -> Result<Price, PriceError> {
    let original = text.trim();
    if original.is_empty() {
        return Err(PriceError::Empty);
    }

    let mut working = original.to_lowercase();

    let per_kilogram = format
        .per_kilogram_markers
        .iter()
        .any(|marker| working.contains(marker));
    if per_kilogram {
        for marker in format.per_kilogram_markers {
            working = working.replace(marker, "");
        }
    }

    for marker in format.currency_markers {
        working = working.replace(marker, "");
    }

    let digits: String = working
        .chars()
        .filter(|c| !format.separators.contains(c))
        .collect();

    if digits.is_empty() {
        return Err(PriceError::Empty);
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PriceError::NonNumeric {
            original: original.to_string(),
            residue: digits,
        });
    }

    let amount = digits
        .parse::<i64>()
        .map_err(|_| PriceError::OutOfRange(original.to_string()))?;

    Ok(Price {
        amount,
        per_kilogram,
    })
}
