//! Integration tests for `CatalogClient` and `QuoteClient`.
//!
//! Each test stands up a `wiremock` server in place of the storefront and
//! the quote page, so no real network traffic is made.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pricefinder_core::StockStatus;
use pricefinder_scraper::{CatalogClient, HttpSettings, QuoteClient, ScraperError};

fn settings(max_retries: u32) -> HttpSettings {
    HttpSettings {
        timeout_secs: 5,
        user_agent: "pricefinder-test/0.1".to_owned(),
        max_retries,
        backoff_base_ms: 0,
    }
}

fn test_client(server: &MockServer) -> CatalogClient {
    CatalogClient::new(&server.uri(), &settings(0)).expect("failed to build test CatalogClient")
}

fn product_page(title: &str) -> String {
    format!("<!doctype html><html><head><title>{title}</title></head><body></body></html>")
}

async fn mount_page(server: &MockServer, serial: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/jp/ja/products/{serial}")))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

const SEARCH_PATH: &str = "/jp/api/commerce/v5/ja/products";

// ---------------------------------------------------------------------------
// resolve
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resolve_direct_hit_keeps_input_serial() {
    let server = MockServer::start().await;
    mount_page(&server, "474479", 200, &product_page("Fleece &amp; Jacket | UNIQLO")).await;

    let entry = test_client(&server)
        .resolve("474479")
        .await
        .expect("resolve")
        .expect("entry");

    assert_eq!(entry.serial_number, "474479");
    assert_eq!(
        entry.product_url,
        format!("{}/jp/ja/products/474479", server.uri())
    );
    assert_eq!(entry.page_title, "Fleece & Jacket | UNIQLO");
}

#[tokio::test]
async fn resolve_follows_search_on_404() {
    let server = MockServer::start().await;
    mount_page(&server, "111111", 404, "").await;
    mount_page(&server, "474479", 200, &product_page("Renamed")).await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("q", "111111"))
        .and(query_param("queryRelaxationFlag", "true"))
        .and(query_param("limit", "36"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "result": {
                "relaxedQueries": ["474479"],
                "items": [{"productId": "E474479-000"}, {"productId": "E999999-000"}]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let entry = test_client(&server)
        .resolve("111111")
        .await
        .expect("resolve")
        .expect("entry");

    assert_eq!(entry.serial_number, "474479");
    assert!(entry.product_url.ends_with("/jp/ja/products/474479"));
    assert_eq!(entry.page_title, "Renamed");
}

#[tokio::test]
async fn resolve_returns_none_when_search_has_no_items() {
    let server = MockServer::start().await;
    mount_page(&server, "000000", 404, "").await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "result": {"relaxedQueries": [], "items": []}
        })))
        .mount(&server)
        .await;

    let result = test_client(&server).resolve("000000").await;
    assert!(matches!(result, Ok(None)), "expected Ok(None), got: {result:?}");
}

#[tokio::test]
async fn resolve_hops_at_most_once() {
    let server = MockServer::start().await;
    mount_page(&server, "111111", 404, "").await;
    mount_page(&server, "222222", 404, "").await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "result": {"relaxedQueries": ["x"], "items": [{"productId": "E222222-000"}]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_client(&server).resolve("111111").await;
    assert!(matches!(result, Ok(None)), "expected Ok(None), got: {result:?}");
}

#[tokio::test]
async fn resolve_surfaces_unsuccessful_search_status() {
    let server = MockServer::start().await;
    mount_page(&server, "111111", 404, "").await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "nok"})))
        .mount(&server)
        .await;

    let err = test_client(&server).resolve("111111").await.unwrap_err();
    assert!(
        matches!(err, ScraperError::SearchStatus { ref status } if status == "nok"),
        "expected SearchStatus, got: {err:?}"
    );
}

#[tokio::test]
async fn resolve_malformed_search_body_is_deserialize_error() {
    let server = MockServer::start().await;
    mount_page(&server, "111111", 404, "").await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server).resolve("111111").await.unwrap_err();
    assert!(
        matches!(err, ScraperError::Deserialize { .. }),
        "expected Deserialize, got: {err:?}"
    );
}

#[tokio::test]
async fn resolve_server_error_is_unexpected_status() {
    let server = MockServer::start().await;
    mount_page(&server, "474479", 500, "").await;

    let err = test_client(&server).resolve("474479").await.unwrap_err();
    assert!(
        matches!(err, ScraperError::UnexpectedStatus { status: 500, .. }),
        "expected UnexpectedStatus(500), got: {err:?}"
    );
}

#[tokio::test]
async fn resolve_retries_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jp/ja/products/474479"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let client = CatalogClient::new(&server.uri(), &settings(1)).unwrap();
    let err = client.resolve("474479").await.unwrap_err();
    assert!(matches!(err, ScraperError::UnexpectedStatus { status: 503, .. }));
}

#[tokio::test]
async fn resolve_does_not_retry_404() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jp/ja/products/000000"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "result": {"relaxedQueries": [], "items": []}
        })))
        .mount(&server)
        .await;

    let client = CatalogClient::new(&server.uri(), &settings(3)).unwrap();
    assert!(matches!(client.resolve("000000").await, Ok(None)));
}

#[tokio::test]
async fn resolve_rate_limited_reads_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jp/ja/products/474479"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "42"))
        .mount(&server)
        .await;

    let err = test_client(&server).resolve("474479").await.unwrap_err();
    match err {
        ScraperError::RateLimited {
            retry_after_secs, ..
        } => assert_eq!(retry_after_secs, 42),
        other => panic!("expected RateLimited, got: {other:?}"),
    }
}

#[tokio::test]
async fn rate_limited_retry_waits_for_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jp/ja/products/474479"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .expect(2)
        .mount(&server)
        .await;

    let client = CatalogClient::new(&server.uri(), &settings(1)).unwrap();
    let started = std::time::Instant::now();
    let err = client.resolve("474479").await.unwrap_err();

    assert!(matches!(err, ScraperError::RateLimited { .. }));
    assert!(
        started.elapsed() >= std::time::Duration::from_secs(1),
        "retry fired before Retry-After elapsed: {:?}",
        started.elapsed()
    );
}

// ---------------------------------------------------------------------------
// fetch_variants
// ---------------------------------------------------------------------------

const VARIANTS_PATH: &str = "/jp/api/commerce/v5/ja/products/E474479-000/price-groups/00/l2s";

#[tokio::test]
async fn fetch_variants_decodes_codes_and_joins_maps() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(VARIANTS_PATH))
        .and(query_param("withPrices", "true"))
        .and(query_param("withStocks", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "result": {
                "l2s": [
                    {"l2Id": "01", "communicationCode": "474479-09-003", "color": {"code": "COL09"}, "size": {"code": "SMA003"}},
                    {"l2Id": "02", "communicationCode": "474479-00-004", "color": {"code": "COL00"}, "size": {"code": "SMA004"}}
                ],
                "stocks": {"01": {"statusCode": "IN_STOCK"}},
                "prices": {"01": {"base": {"value": 2990}}, "02": {"base": {"value": 1990}}}
            }
        })))
        .mount(&server)
        .await;

    let variants = test_client(&server).fetch_variants("474479").await.unwrap();
    assert_eq!(variants.len(), 2);
    assert_eq!(variants[0].color, "Black 黑");
    assert_eq!(variants[0].size, "S");
    assert_eq!(variants[0].price, 2990);
    assert_eq!(variants[0].stock_status, StockStatus::InStock);
    assert_eq!(variants[1].color, "White 白");
    assert_eq!(variants[1].stock_status, StockStatus::Unknown);
    assert_eq!(variants[1].price, 1990);
}

#[tokio::test]
async fn fetch_variants_malformed_json_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(VARIANTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "nok"})))
        .mount(&server)
        .await;

    let err = test_client(&server).fetch_variants("474479").await.unwrap_err();
    assert!(
        matches!(err, ScraperError::Deserialize { .. }),
        "expected Deserialize, got: {err:?}"
    );
}

// ---------------------------------------------------------------------------
// QuoteClient
// ---------------------------------------------------------------------------

fn quote_client(server: &MockServer) -> QuoteClient {
    QuoteClient::new(&server.uri(), "TWD", "YMlKec fxKbKc", &settings(0)).unwrap()
}

#[tokio::test]
async fn fetch_rate_reads_configured_class() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/finance/quote/JPY-TWD"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><div class="YMlKec">9.99</div><div class="YMlKec fxKbKc">0.2105</div></body></html>"#,
        ))
        .mount(&server)
        .await;

    let rate = quote_client(&server).fetch_rate().await.expect("rate");
    assert!((rate - 0.2105).abs() < 1e-9);
}

#[tokio::test]
async fn fetch_rate_missing_element_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/finance/quote/JPY-TWD"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>consent</body></html>"))
        .mount(&server)
        .await;

    let client = quote_client(&server);
    assert_eq!(client.fetch_rate().await, None);
    assert!(matches!(
        client.try_fetch_rate().await,
        Err(ScraperError::MissingElement { .. })
    ));
}

#[tokio::test]
async fn fetch_rate_server_error_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/finance/quote/JPY-TWD"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    assert_eq!(quote_client(&server).fetch_rate().await, None);
}
