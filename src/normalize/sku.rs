//! SKU derivation
//!
//! Sites expose vendor codes in one of two ways: as the filename of the
//! product image (`.../products/AB-1234.png`) or as a labelled line on the
//! product detail page (`Código de Barras: 7840001234567`).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkuError {
    #[error("image path is empty")]
    EmptyPath,

    #[error("label '{0}' not found")]
    LabelNotFound(String),

    #[error("no value after delimiter '{0}'")]
    MissingValue(char),
}

/// Derives a SKU from an image source path
///
/// Takes the final path segment (ignoring any query string or fragment),
/// strips the file extension and returns the remainder. If the remainder looks
/// like a stock placeholder image (it contains one of `placeholders`,
/// case-insensitively) the SKU is the empty string.
///
/// # Example
///
/// ```
/// use catalog_crawler::normalize::sku_from_image_path;
///
/// let sku = sku_from_image_path("/img/products/AB-1234.png", &["default"]).unwrap();
/// assert_eq!(sku, "AB-1234");
/// ```
pub fn sku_from_image_path<S: AsRef<str>>(
    path: &str,
    placeholders: &[S],
) -> Result<String, SkuError> {
    let path = path.trim();
    let path = path.split(['?', '#']).next().unwrap_or_default();

    let file_name = path.rsplit('/').next().unwrap_or_default();
    if file_name.is_empty() {
        return Err(SkuError::EmptyPath);
    }

    let stem = match file_name.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => file_name,
    };

    let lowered = stem.to_lowercase();
    if placeholders
        .iter()
        .any(|marker| lowered.contains(&marker.as_ref().to_lowercase()))
    {
        return Ok(String::new());
    }

    Ok(stem.to_string())
}

/// Extracts a SKU from a labelled text field such as `"Código de Barras: 123"`
///
/// The text must contain `label`. The value is the segment between the first
/// and second `delimiter`, trimmed, with embedded line breaks removed.
pub fn sku_from_labeled_text(text: &str, label: &str, delimiter: char) -> Result<String, SkuError> {
    if !text.contains(label) {
        return Err(SkuError::LabelNotFound(label.to_string()));
    }

    let value = text
        .split(delimiter)
        .nth(1)
        .ok_or(SkuError::MissingValue(delimiter))?;

    let value: String = value.trim().chars().filter(|c| *c != '\n' && *c != '\r').collect();
    if value.is_empty() {
        return Err(SkuError::MissingValue(delimiter));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLACEHOLDERS: &[&str] = &["default"];

    #[test]
    fn test_placeholder_image_yields_empty_sku() {
        let sku = sku_from_image_path(
            "https://www.arete.com.py/img/products/default.jpg",
            PLACEHOLDERS,
        )
        .unwrap();
        assert_eq!(sku, "");
    }

    #[test]
    fn test_image_filename_is_sku() {
        let sku = sku_from_image_path(
            "https://www.arete.com.py/img/products/AB-1234.png",
            PLACEHOLDERS,
        )
        .unwrap();
        assert_eq!(sku, "AB-1234");
    }

    #[test]
    fn test_placeholder_match_is_case_insensitive() {
        let sku = sku_from_image_path("/img/Default-small.jpg", PLACEHOLDERS).unwrap();
        assert_eq!(sku, "");
    }

    #[test]
    fn test_query_string_ignored() {
        let sku = sku_from_image_path("/img/7840001.jpg?v=3", PLACEHOLDERS).unwrap();
        assert_eq!(sku, "7840001");
    }

    #[test]
    fn test_no_extension() {
        let sku = sku_from_image_path("/img/XY99", PLACEHOLDERS).unwrap();
        assert_eq!(sku, "XY99");
    }

    #[test]
    fn test_empty_path() {
        assert_eq!(sku_from_image_path("  ", PLACEHOLDERS), Err(SkuError::EmptyPath));
        assert_eq!(
            sku_from_image_path("/img/products/", PLACEHOLDERS),
            Err(SkuError::EmptyPath)
        );
    }

    #[test]
    fn test_labeled_text() {
        let sku = sku_from_labeled_text(
            "Código de Barras:  7840001234567\n",
            "Código de Barras",
            ':',
        )
        .unwrap();
        assert_eq!(sku, "7840001234567");
    }

    #[test]
    fn test_labeled_text_strips_inner_line_breaks() {
        let sku = sku_from_labeled_text("Código de Barras: 78400\n01234", "Código de Barras", ':')
            .unwrap();
        assert_eq!(sku, "7840001234");
    }

    #[test]
    fn test_labeled_text_missing_label() {
        assert_eq!(
            sku_from_labeled_text("Marca: Acme", "Código de Barras", ':'),
            Err(SkuError::LabelNotFound("Código de Barras".to_string()))
        );
    }

    #[test]
    fn test_labeled_text_missing_value() {
        assert_eq!(
            sku_from_labeled_text("Código de Barras", "Código de Barras", ':'),
            Err(SkuError::MissingValue(':'))
        );
        assert_eq!(
            sku_from_labeled_text("Código de Barras:   ", "Código de Barras", ':'),
            Err(SkuError::MissingValue(':'))
        );
    }
}
