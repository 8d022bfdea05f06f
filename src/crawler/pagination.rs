//! Pagination navigator
//!
//! Each category is walked as a small state machine:
//!
//! ```text
//! Fetching(category_url) --fetch--> HasNext(next_url) --advance--> Fetching(next_url)
//!                               \-> Exhausted
//! ```
//!
//! After a page is fetched its pagination control is inspected. The first link
//! in document order that carries the site's "next" marker wins; no link, no
//! control, or an unusable href all mean the category is exhausted.

use crate::crawler::provider::Document;
use crate::crawler::rules::{compile_selector, NextMarker, PaginationRule};
use crate::normalize::resolve_url;
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Position of the pagination loop within one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    /// The page at this URL is about to be fetched
    Fetching(Url),

    /// The current page links to this next page
    HasNext(Url),

    /// No further pages (terminal)
    Exhausted,
}

impl PageCursor {
    /// Initial state for a category
    pub fn start(category_url: Url) -> Self {
        Self::Fetching(category_url)
    }

    /// Moves from `HasNext` to `Fetching`; every other state is unchanged
    pub fn advance(self) -> Self {
        match self {
            Self::HasNext(url) => Self::Fetching(url),
            other => other,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }
}

/// Compiled pagination rule
#[derive(Debug, Clone)]
pub struct Navigator {
    container: Selector,
    links: Selector,
    next: NextMarker,
}

impl Navigator {
    pub fn new(rule: &PaginationRule) -> Result<Self, ConfigError> {
        Ok(Self {
            container: compile_selector(&rule.container)?,
            links: compile_selector(&rule.links)?,
            next: rule.next.clone(),
        })
    }

    /// Inspects a fetched page and decides where the loop goes next
    ///
    /// Returns `HasNext` with the resolved next URL, or `Exhausted`.
    pub fn inspect(&self, page: &Document) -> PageCursor {
        for control in page.html.select(&self.container) {
            for link in control.select(&self.links) {
                if !self.is_next(link) {
                    continue;
                }

                let Some(href) = link.value().attr("href") else {
                    tracing::debug!("Next-page marker without href on {}", page.url);
                    continue;
                };

                match resolve_url(&page.url, href) {
                    Some(next) => return PageCursor::HasNext(next),
                    None => {
                        tracing::debug!("Unusable next-page href '{}' on {}", href, page.url);
                    }
                }
            }
        }

        PageCursor::Exhausted
    }

    fn is_next(&self, link: scraper::ElementRef<'_>) -> bool {
        match &self.next {
            NextMarker::Rel(token) => link
                .value()
                .attr("rel")
                .map(|rel| rel.split_whitespace().any(|part| part.contains(token.as_str())))
                .unwrap_or(false),
            NextMarker::Text(label) => link.text().collect::<String>().contains(label.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str, body: &str) -> Document {
        Document::parse(Url::parse(url).unwrap(), body)
    }

    fn rel_navigator() -> Navigator {
        Navigator::new(&PaginationRule::rel_next(".pagination", "li a")).unwrap()
    }

    #[test]
    fn test_rel_next_found() {
        let doc = page(
            "https://shop.example/bebidas",
            r#"<ul class="pagination">
                <li><a href="?page=1" rel="prev">1</a></li>
                <li><a href="?page=3" rel="next">3</a></li>
            </ul>"#,
        );
        assert_eq!(
            rel_navigator().inspect(&doc),
            PageCursor::HasNext(Url::parse("https://shop.example/bebidas?page=3").unwrap())
        );
    }

    #[test]
    fn test_no_pagination_control_is_exhausted() {
        let doc = page("https://shop.example/bebidas", "<div class='item'></div>");
        assert_eq!(rel_navigator().inspect(&doc), PageCursor::Exhausted);
    }

    #[test]
    fn test_control_with_zero_links_is_exhausted() {
        let doc = page(
            "https://shop.example/bebidas",
            r#"<ul class="pagination"></ul>"#,
        );
        assert_eq!(rel_navigator().inspect(&doc), PageCursor::Exhausted);
    }

    #[test]
    fn test_last_page_without_next_is_exhausted() {
        let doc = page(
            "https://shop.example/bebidas?page=3",
            r#"<ul class="pagination">
                <li><a href="?page=2" rel="prev">2</a></li>
                <li><a href="?page=3">3</a></li>
            </ul>"#,
        );
        assert_eq!(rel_navigator().inspect(&doc), PageCursor::Exhausted);
    }

    #[test]
    fn test_first_match_wins() {
        let doc = page(
            "https://shop.example/bebidas",
            r#"<ul class="pagination">
                <li><a href="/bebidas/2" rel="next">2</a></li>
                <li><a href="/bebidas/9" rel="next">9</a></li>
            </ul>"#,
        );
        assert_eq!(
            rel_navigator().inspect(&doc),
            PageCursor::HasNext(Url::parse("https://shop.example/bebidas/2").unwrap())
        );
    }

    #[test]
    fn test_rel_with_multiple_tokens() {
        let doc = page(
            "https://shop.example/a",
            r#"<ul class="pagination"><li><a href="/a/2" rel="nofollow next">›</a></li></ul>"#,
        );
        assert!(matches!(
            rel_navigator().inspect(&doc),
            PageCursor::HasNext(_)
        ));
    }

    #[test]
    fn test_marker_without_href_is_skipped() {
        let doc = page(
            "https://shop.example/a",
            r#"<ul class="pagination">
                <li><a rel="next">›</a></li>
                <li><a href="/a/2" rel="next">2</a></li>
            </ul>"#,
        );
        assert_eq!(
            rel_navigator().inspect(&doc),
            PageCursor::HasNext(Url::parse("https://shop.example/a/2").unwrap())
        );
    }

    #[test]
    fn test_text_label() {
        let navigator =
            Navigator::new(&PaginationRule::labeled(".product-pager-box", "a", "Siguiente"))
                .unwrap();
        let doc = page(
            "http://www.stock.com.py/category/3-lacteos.aspx",
            r#"<div class="product-pager-box"><div>
                <a href="/category/3-lacteos.aspx?pageindex=1">Anterior</a>
                <a href="/category/3-lacteos.aspx?pageindex=3">Siguiente &raquo;</a>
            </div></div>"#,
        );
        assert_eq!(
            navigator.inspect(&doc),
            PageCursor::HasNext(
                Url::parse("http://www.stock.com.py/category/3-lacteos.aspx?pageindex=3").unwrap()
            )
        );
    }

    #[test]
    fn test_cursor_transitions() {
        let url = Url::parse("https://shop.example/a").unwrap();
        assert_eq!(
            PageCursor::HasNext(url.clone()).advance(),
            PageCursor::Fetching(url.clone())
        );
        assert_eq!(PageCursor::Exhausted.advance(), PageCursor::Exhausted);
        assert!(PageCursor::Exhausted.is_exhausted());
        assert!(!PageCursor::start(url).is_exhausted());
    }
}
