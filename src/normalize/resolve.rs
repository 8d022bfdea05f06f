use url::Url;

/// Resolves an href against the page it was found on
///
/// Returns None if the link cannot be followed:
/// - empty hrefs and fragment-only anchors
/// - javascript:, mailto:, tel: and data: links
/// - anything that does not resolve to an HTTP(S) URL
///
/// # Example
///
/// ```
/// use catalog_crawler::normalize::resolve_url;
/// use url::Url;
///
/// let base = Url::parse("https://shop.example/category/3-lacteos").unwrap();
/// let next = resolve_url(&base, "?page=2").unwrap();
/// assert_eq!(next.as_str(), "https://shop.example/category/3-lacteos?page=2");
/// ```
pub fn resolve_url(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let absolute = base.join(href).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(absolute),
        _ => None,
    }
}
