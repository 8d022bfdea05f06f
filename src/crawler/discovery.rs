//! Category discovery
//!
//! Reads the navigation menu of the start page and returns the ordered list of
//! category listings to crawl.

use crate::catalog::{Category, CategoryIndex};
use crate::crawler::provider::Document;
use crate::crawler::rules::{compile_selector, CategoryFilter, CategoryRule};
use crate::normalize::{capture_id, resolve_url};
use crate::ConfigError;
use regex::Regex;
use scraper::Selector;

/// Compiled category rule
#[derive(Debug, Clone)]
pub struct CategoryDiscovery {
    links: Selector,
    filter: CategoryFilter,
    id_pattern: Option<Regex>,
}

impl CategoryDiscovery {
    pub fn new(rule: &CategoryRule) -> Result<Self, ConfigError> {
        let id_pattern = rule
            .id_pattern
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| {
                    ConfigError::InvalidPattern(format!("'{}': {}", pattern, e))
                })
            })
            .transpose()?;

        Ok(Self {
            links: compile_selector(&rule.link_selector)?,
            filter: rule.filter.clone(),
            id_pattern,
        })
    }

    /// Returns the categories linked from `page`, in document order
    ///
    /// Links rejected by the filter, links that do not resolve, categories
    /// whose id cannot be read, and categories already present in `index` are
    /// left out.
    pub fn discover(&self, page: &Document, index: &mut CategoryIndex) -> Vec<Category> {
        let mut categories = Vec::new();

        for link in page.html.select(&self.links) {
            let Some(href) = link.value().attr("href").map(str::trim) else {
                continue;
            };

            if !self.filter.accepts(href) {
                tracing::trace!("Ignoring menu link {}", href);
                continue;
            }

            let Some(url) = resolve_url(&page.url, href) else {
                tracing::debug!("Ignoring unresolvable menu link '{}'", href);
                continue;
            };

            let id = match &self.id_pattern {
                Some(pattern) => match capture_id(pattern, url.as_str()) {
                    Some(id) => id,
                    None => {
                        tracing::warn!("Skipping category {} (could not read its id)", url);
                        continue;
                    }
                },
                None => 0,
            };

            let category = Category::new(id, url);
            if index.insert(&category) {
                categories.push(category);
            }
        }

        categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn page(url: &str, body: &str) -> Document {
        Document::parse(Url::parse(url).unwrap(), body)
    }

    fn menu_rule() -> CategoryRule {
        CategoryRule {
            link_selector: "#dl-menu a".to_string(),
            filter: CategoryFilter::new()
                .require("https://")
                .exclude("ofertas")
                .exclude("novedades"),
            id_pattern: None,
        }
    }

    #[test]
    fn test_discovers_in_menu_order() {
        let doc = page(
            "https://www.arete.com.py/",
            r##"<ul id="dl-menu">
                <li><a href="https://www.arete.com.py/bebidas">Bebidas</a></li>
                <li><a href="#">Menú</a></li>
                <li><a href="/relative">Relativo</a></li>
                <li><a href="https://www.arete.com.py/ofertas">Ofertas</a></li>
                <li><a href="https://www.arete.com.py/novedades">Novedades</a></li>
                <li><a href="https://www.arete.com.py/almacen">Almacén</a></li>
            </ul>
            <a href="https://www.arete.com.py/fuera-del-menu">Fuera</a>"##,
        );

        let discovery = CategoryDiscovery::new(&menu_rule()).unwrap();
        let mut index = CategoryIndex::new();
        let categories = discovery.discover(&doc, &mut index);

        let urls: Vec<&str> = categories.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.arete.com.py/bebidas",
                "https://www.arete.com.py/almacen"
            ]
        );
        assert!(categories.iter().all(|c| c.id == 0));
    }

    #[test]
    fn test_repeated_links_are_discovered_once() {
        let doc = page(
            "https://www.arete.com.py/",
            r#"<ul id="dl-menu">
                <li><a href="https://www.arete.com.py/bebidas">Bebidas</a></li>
                <li><a href="https://www.arete.com.py/bebidas">Bebidas (otra vez)</a></li>
            </ul>"#,
        );

        let discovery = CategoryDiscovery::new(&menu_rule()).unwrap();
        let mut index = CategoryIndex::new();
        assert_eq!(discovery.discover(&doc, &mut index).len(), 1);
    }

    #[test]
    fn test_ids_from_pattern() {
        let rule = CategoryRule {
            link_selector: "a".to_string(),
            filter: CategoryFilter::new().require("/category/"),
            id_pattern: Some(r"/category/(\d+)-".to_string()),
        };
        let doc = page(
            "http://www.superseis.com.py/default.aspx",
            r#"<a href="/category/12-bebidas.aspx">Bebidas</a>
               <a href="/category/sin-id.aspx">Roto</a>
               <a href="/products/5-x.aspx">Producto</a>
               <a href="http://www.superseis.com.py/category/12-bebidas.aspx?x=1">Bebidas</a>
               <a href="/category/40-limpieza.aspx">Limpieza</a>"#,
        );

        let discovery = CategoryDiscovery::new(&rule).unwrap();
        let mut index = CategoryIndex::new();
        let categories = discovery.discover(&doc, &mut index);

        let found: Vec<(i64, &str)> = categories
            .iter()
            .map(|c| (c.id, c.url.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![
                (12, "http://www.superseis.com.py/category/12-bebidas.aspx"),
                (40, "http://www.superseis.com.py/category/40-limpieza.aspx"),
            ]
        );
        assert_eq!(
            index.url_for(40).map(|u| u.as_str()),
            Some("http://www.superseis.com.py/category/40-limpieza.aspx")
        );
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let rule = CategoryRule {
            link_selector: "a".to_string(),
            filter: CategoryFilter::new(),
            id_pattern: Some("(unclosed".to_string()),
        };
        assert!(matches!(
            CategoryDiscovery::new(&rule),
            Err(ConfigError::InvalidPattern(_))
        ));
    }
}
