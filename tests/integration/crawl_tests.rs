//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small storefront and run the full
//! home → category → product → variation cycle end-to-end.

use catalog_crawler::config::{Config, TerminationPolicy};
use catalog_crawler::crawler::{crawl, Coordinator, TaskKind};
use catalog_crawler::output::export_records;
use catalog_crawler::FieldValue;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration seeded with the mock storefront's home page
fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.crawler.workers = 4;
    config.crawler.idle_timeout_ms = 200;
    config.crawler.seed_url = format!("{}/en/home/", base_url);
    config.crawler.seed_kind = TaskKind::Home;
    config.fetcher.timeout_secs = 5;
    config
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

fn variation_payload(pid: &str, color: &str) -> String {
    json!({
        "product": {
            "productName": "Air Zoom",
            "brand": "Nike",
            "color": color,
            "shortDescription": "Road running shoe.",
            "pdpProductHtml": format!(
                r#"<div><h1 class="b-pdp__product-name">Air Zoom {}</h1><div class="price__regular">AED 499.00</div></div>"#,
                color
            )
        },
        "pageDataLayer": {
            "availableSizes": ["41", "42"],
            "pageDataMoeEvents": [{"eventData": {"sku_id": pid, "category": "Shoes"}}]
        }
    })
    .to_string()
}

/// Mounts a storefront with two categories, a paginated listing, three
/// products (one failing) and three colour variations
///
/// Every page carries `.expect(1)` so the mock server verifies on drop that
/// no URL was fetched twice.
async fn mount_storefront(server: &MockServer) {
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/en/home/"))
        .respond_with(html(format!(
            r#"<html><body><nav>
            <a class="b-megamenu__link" href="/en/men/">Men</a>
            <a class="b-megasubmenu__link" href="{base}/en/women/">Women</a>
            <a class="b-megamenu__link" href="/en/men/#top">Men again</a>
            </nav></body></html>"#
        )))
        .expect(1)
        .mount(server)
        .await;

    // Second page of the men's listing; mounted first so it wins over /en/men/
    Mock::given(method("GET"))
        .and(path("/en/men/"))
        .and(query_param("start", "24"))
        .respond_with(html(
            r#"<html><body>
            <div class="b-product-tile"><a class="b-product-tile__image-link" href="/en/broken.html">x</a></div>
            <div class="b-product-tile"><a class="b-product-tile__image-link" href="/en/air-zoom.html">x</a></div>
            </body></html>"#
                .to_string(),
        ))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/en/men/"))
        .respond_with(html(
            r#"<html><body>
            <div class="b-linkslist"><a href="/en/women/">Women</a></div>
            <div class="b-product-tile"><a class="b-product-tile__image-link" href="/en/air-zoom.html?utm_source=grid">x</a></div>
            <div class="b-product-tile"><a class="b-product-tile__image-link" href="/en/socks.html">x</a></div>
            <div class="b-product-grid__footer-show-more"><button data-url="/en/men/?start=24">Load more</button></div>
            </body></html>"#
                .to_string(),
        ))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/en/women/"))
        .respond_with(html(
            r#"<html><body>
            <div class="b-product-tile"><a class="b-product-tile__image-link" href="/en/socks.html">x</a></div>
            </body></html>"#
                .to_string(),
        ))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/en/air-zoom.html"))
        .respond_with(html(
            r#"<html><head>
            <script>pageDataLayer = {"availableSizes":["40","41"],"pageDataMoeEvents":[{"eventData":{"sku_id":"AZ-010","color":"Black"}}]};</script>
            </head><body>
            <h1 class="b-pdp__product-name">Air Zoom</h1>
            <div class="price__regular">AED 499.00</div>
            <button class="color-attribute m-selected" data-url="/en/variation?pid=AZ-010">Black</button>
            <button class="color-attribute" data-url="/en/variation?pid=AZ-100">White</button>
            <button class="color-attribute" data-url="/en/variation?pid=AZ-600">Red</button>
            <button class="color-attribute" data-url="/en/variation?pid=AZ-300">Green</button>
            </body></html>"#
                .to_string(),
        ))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/en/socks.html"))
        .respond_with(html(
            r#"<html><body><h1 class="b-pdp__product-name">Crew Socks</h1></body></html>"#
                .to_string(),
        ))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/en/broken.html"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(server)
        .await;

    for (pid, color) in [("AZ-100", "White"), ("AZ-600", "Red"), ("AZ-300", "Green")] {
        Mock::given(method("GET"))
            .and(path("/en/variation"))
            .and(query_param("pid", pid))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(variation_payload(pid, color))
                    .insert_header("content-type", "application/json"),
            )
            .expect(1)
            .mount(server)
            .await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_full_crawl_storefront() {
    let server = MockServer::start().await;
    mount_storefront(&server).await;

    let config = create_test_config(&server.uri());
    let outcome = crawl(&config).await.expect("Crawl failed");

    let mut names: Vec<&str> = outcome
        .records
        .iter()
        .filter_map(|record| record.text("name"))
        .collect();
    names.sort_unstable();
    assert_eq!(
        names,
        vec![
            "Air Zoom",
            "Air Zoom Green",
            "Air Zoom Red",
            "Air Zoom White",
            "Crew Socks"
        ]
    );

    let stats = &outcome.statistics;
    assert_eq!(stats.kind(TaskKind::Home).completed, 1);
    assert_eq!(stats.kind(TaskKind::Category).completed, 3);
    assert_eq!(stats.kind(TaskKind::Product).completed, 3);
    assert_eq!(stats.kind(TaskKind::Product).fetch_failures, 1);
    // Every unselected colour becomes exactly one variation task
    assert_eq!(stats.kind(TaskKind::ProductVariation).completed, 3);
    assert_eq!(stats.total_failures(), 1);
    assert_eq!(stats.records, 5);
    assert_eq!(stats.tasks_enqueued, 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_variation_records_take_payload_sizes() {
    let server = MockServer::start().await;
    mount_storefront(&server).await;

    let outcome = crawl(&create_test_config(&server.uri()))
        .await
        .expect("Crawl failed");

    let white = outcome
        .records
        .iter()
        .find(|record| record.text("sku_id") == Some("AZ-100"))
        .expect("white variation record");

    assert_eq!(white.text("color"), Some("White"));
    assert_eq!(white.text("price"), Some("AED 499.00"));
    assert_eq!(
        white.get("available_sizes"),
        Some(&FieldValue::List(vec!["41".to_string(), "42".to_string()]))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_idle_termination_still_collects_fast_site() {
    let server = MockServer::start().await;
    mount_storefront(&server).await;

    let mut config = create_test_config(&server.uri());
    config.crawler.termination = TerminationPolicy::Idle;
    config.crawler.idle_timeout_ms = 2000;

    let outcome = crawl(&config).await.expect("Crawl failed");

    assert_eq!(outcome.records.len(), 5);
}

#[tokio::test]
async fn test_unreachable_seed_yields_empty_crawl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(&create_test_config(&server.uri()))
        .expect("Failed to create coordinator");
    coordinator
        .seed(&format!("{}/en/home/", server.uri()), TaskKind::Home)
        .expect("Failed to seed");

    let outcome = tokio::time::timeout(Duration::from_secs(10), coordinator.run())
        .await
        .expect("Crawl did not terminate")
        .expect("Crawl failed");

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.statistics.kind(TaskKind::Home).fetch_failures, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_crawl_then_export() {
    let server = MockServer::start().await;
    mount_storefront(&server).await;

    let outcome = crawl(&create_test_config(&server.uri()))
        .await
        .expect("Crawl failed");

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let csv_path = dir.path().join("output.csv");
    let written = export_records(&outcome.records, &csv_path, b',').expect("Export failed");
    assert_eq!(written, 5);

    let mut reader = csv::Reader::from_path(&csv_path).expect("Failed to open CSV");
    let headers = reader.headers().expect("Missing header row").clone();
    assert!(headers.iter().any(|h| h == "name"));
    assert!(headers.iter().any(|h| h == "available_sizes"));

    let size_column = headers
        .iter()
        .position(|h| h == "available_sizes")
        .expect("available_sizes column");
    let rows: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .expect("Malformed CSV");
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().any(|row| &row[size_column] == "41, 42"));
}
