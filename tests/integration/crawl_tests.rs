//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small storefront and run the full
//! crawl cycle end-to-end through the HTTP provider and the output sinks.

use catalog_crawler::config::{CategoryErrorPolicy, HttpConfig, UserAgentConfig};
use catalog_crawler::crawler::{Crawler, HttpProvider, SiteRules};
use catalog_crawler::output::{JsonLinesSink, ProductSink, RunStatus, SqliteSink};
use catalog_crawler::{CatalogError, Product, SiteId};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_provider() -> HttpProvider {
    let user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: None,
    };
    let http = HttpConfig {
        timeout_secs: 5,
        connect_timeout_secs: 2,
    };
    HttpProvider::from_config(&user_agent, &http).expect("Failed to build provider")
}

/// Stock's rule set pointed at the mock server
fn stock_rules(server: &MockServer) -> SiteRules {
    SiteId::Stock
        .rules()
        .with_start_url(format!("{}/default.aspx", server.uri()))
}

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/html")
}

async fn mount_page(server: &MockServer, page_path: &str, body: impl Into<String>) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn item(id: u32, title: &str, price: &str) -> String {
    format!(
        r#"<div class="product-item">
             <a class="product-title-link" href="/products/{id}-item.aspx"></a>
             <h2 class="product-title"><a href="/products/{id}-item.aspx">{title}</a></h2>
             <span class="price-label">{price}</span>
           </div>"#
    )
}

fn listing(items: &[String], next: Option<&str>) -> String {
    let pager = match next {
        Some(href) => format!(
            r#"<div class="product-pager-box"><div><a href="{href}">Siguiente &raquo;</a></div></div>"#
        ),
        None => r#"<div class="product-pager-box"><div><span>1</span></div></div>"#.to_string(),
    };
    format!("<html><body>{}{}</body></html>", items.concat(), pager)
}

/// Two categories; the first spans two pages and lists an unpriced item, the
/// second repeats a product from the first
async fn mount_storefront(server: &MockServer) {
    mount_page(
        server,
        "/default.aspx",
        r#"<html><body><ul class="menu">
            <li><a href="/category/12-bebidas.aspx">Bebidas</a></li>
            <li><a href="/category/40-lacteos.aspx">Lácteos</a></li>
            <li><a href="/contacto.aspx">Contacto</a></li>
        </ul></body></html>"#,
    )
    .await;

    mount_page(
        server,
        "/category/12-bebidas.aspx",
        listing(
            &[
                item(1, "Agua 2L", "3.500"),
                item(2, "Gaseosa 1.5L", "9.000"),
                item(3, "Jugo Natural", "Consultar"),
            ],
            Some("/category/12-bebidas/pagina-2.aspx"),
        ),
    )
    .await;

    mount_page(
        server,
        "/category/12-bebidas/pagina-2.aspx",
        listing(&[item(5, "Cerveza 1L", "12.000")], None),
    )
    .await;

    mount_page(
        server,
        "/category/40-lacteos.aspx",
        listing(
            &[item(2, "Gaseosa 1.5L", "9.000"), item(4, "Leche 1L", "6.450")],
            None,
        ),
    )
    .await;

    // Detail pages for 1 and 4 only; the others answer 404
    mount_page(
        server,
        "/products/1-item.aspx",
        r#"<div class="sku">Código de Barras: 7840000000011</div>"#,
    )
    .await;
    mount_page(
        server,
        "/products/4-item.aspx",
        r#"<div class="sku">Código de Barras: 7840000000042</div>"#,
    )
    .await;
}

#[tokio::test]
async fn test_full_crawl_to_json_lines_and_sqlite() {
    let mock_server = MockServer::start().await;
    mount_storefront(&mock_server).await;

    let temp_dir = TempDir::new().unwrap();
    let jsonl_path = temp_dir.path().join("stock.jsonl");
    let db_path = temp_dir.path().join("crawl.db");

    let provider = test_provider();
    let rules = stock_rules(&mock_server);
    let mut jsonl = JsonLinesSink::create(&jsonl_path).unwrap();
    let mut db = SqliteSink::open(&db_path, &rules.name, "test-hash").unwrap();

    let crawler = Crawler::new(&provider, &rules).unwrap();
    let report = crawler
        .run(|product| {
            jsonl.write_product(&product)?;
            db.write_product(&product)
        })
        .await
        .expect("Crawl should succeed");

    jsonl.finish(&report).unwrap();
    db.finish(&report).unwrap();

    assert_eq!(report.categories_discovered, 2);
    assert_eq!(report.categories_completed, 2);
    assert_eq!(report.pages_fetched, 4);
    assert_eq!(report.products_emitted, 4);
    assert_eq!(report.duplicates_dropped, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].product_id, Some(3));
    assert_eq!(report.detail_pages_fetched, 2);
    assert_eq!(report.sku_unavailable, 2);
    assert!(report.is_complete());

    let content = std::fs::read_to_string(&jsonl_path).unwrap();
    let products: Vec<Product> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 5, 4]);

    let first = &products[0];
    assert_eq!(first.name, "Agua 2L");
    assert_eq!(first.price, 3500);
    assert_eq!(first.category_id, 12);
    assert_eq!(first.sku, "7840000000011");
    assert_eq!(first.url, format!("{}/products/1-item.aspx", mock_server.uri()));

    assert_eq!(products[1].sku, "");
    assert_eq!(products[3].category_id, 40);
    assert_eq!(products[3].sku, "7840000000042");

    assert_eq!(db.product_count().unwrap(), 4);
    assert_eq!(db.status().unwrap(), Some(RunStatus::Completed));
}

#[tokio::test]
async fn test_failed_category_page_is_skipped_by_default() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/default.aspx",
        r#"<a href="/category/7-rota.aspx">Rota</a>
           <a href="/category/8-almacen.aspx">Almacén</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/category/7-rota.aspx"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/category/8-almacen.aspx",
        listing(&[item(80, "Arroz 1kg", "7.900")], None),
    )
    .await;

    let provider = test_provider();
    let rules = stock_rules(&mock_server);
    let mut products = Vec::new();
    let report = Crawler::new(&provider, &rules)
        .unwrap()
        .run(|product| {
            products.push(product);
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, 80);
    assert_eq!(report.failed_categories.len(), 1);
    assert_eq!(report.failed_categories[0].pages_completed, 0);
    assert!(report.failed_categories[0].message.contains("500"));
    assert!(!report.is_complete());

    let aborted = Crawler::new(&provider, &rules)
        .unwrap()
        .with_policy(CategoryErrorPolicy::Abort)
        .run(|_| Ok(()))
        .await;
    assert!(matches!(aborted, Err(CatalogError::CategoryFetch { .. })));
}

#[tokio::test]
async fn test_start_page_not_found() {
    let mock_server = MockServer::start().await;

    let provider = test_provider();
    let rules = stock_rules(&mock_server);
    let result = Crawler::new(&provider, &rules)
        .unwrap()
        .run(|_| Ok(()))
        .await;

    assert!(matches!(result, Err(CatalogError::StartPage { .. })));
}

#[tokio::test]
async fn test_non_html_start_page() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/default.aspx"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"categories": []}"#, "application/json"),
        )
        .mount(&mock_server)
        .await;

    let provider = test_provider();
    let rules = stock_rules(&mock_server);
    let result = Crawler::new(&provider, &rules)
        .unwrap()
        .run(|_| Ok(()))
        .await;

    match result {
        Err(CatalogError::StartPage { source, .. }) => {
            assert!(source.to_string().contains("application/json"));
        }
        other => panic!("Expected start page failure, got {:?}", other.map(|r| r.site)),
    }
}
