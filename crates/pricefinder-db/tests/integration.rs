//! Offline unit tests for pricefinder-db pool configuration and row types.
//! These tests do not require a live database connection.

use chrono::{Duration, Utc};
use pricefinder_core::{build_app_config, CachedLookup, LookupResult, SearchChannel};
use pricefinder_db::{
    connect_pool_from_config, DbError, PoolConfig, PriceCacheRow, SearchHistoryRow,
};
use sqlx::types::Json;

fn sample_result() -> LookupResult {
    LookupResult {
        serial_number: "474479".to_string(),
        product_url: "https://www.uniqlo.com/jp/ja/products/474479".to_string(),
        page_title: "Fleece Jacket".to_string(),
        price_jp: 2990,
        price_converted: 629,
        variants: vec![],
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = build_app_config(|key| match key {
        "DATABASE_URL" => Ok("postgres://example".to_string()),
        "PRICEFINDER_DB_MAX_CONNECTIONS" => Ok("42".to_string()),
        "PRICEFINDER_DB_MIN_CONNECTIONS" => Ok("7".to_string()),
        "PRICEFINDER_DB_ACQUIRE_TIMEOUT_SECS" => Ok("9".to_string()),
        _ => Err(std::env::VarError::NotPresent),
    })
    .expect("config builds");

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn price_cache_row_converts_into_cached_lookup() {
    let now = Utc::now();
    let row = PriceCacheRow {
        id: 1,
        identifier: "474479".to_string(),
        serial_number: "474479".to_string(),
        payload: Json(sample_result()),
        cached_at: now,
        expires_at: now + Duration::hours(1),
        access_count: 3,
        last_accessed_at: now,
    };

    let cached = CachedLookup::from(row);
    assert_eq!(cached.identifier, "474479");
    assert_eq!(cached.payload, sample_result());
    assert_eq!(cached.access_count, 3);
    assert_eq!((cached.expires_at - cached.cached_at).num_minutes(), 60);
}

/// Compile-time smoke test: confirm that [`SearchHistoryRow`] has all
/// expected fields with the correct types. No database required.
#[test]
fn search_history_row_has_expected_fields() {
    let row = SearchHistoryRow {
        id: 7,
        identifier: "000000".to_string(),
        serial_number: None,
        success: false,
        payload: None,
        error_message: Some("product 000000 not found".to_string()),
        source_channel: "linebot".to_string(),
        user_id: Some("U123".to_string()),
        searched_at: Utc::now(),
    };

    assert!(!row.success);
    assert!(row.payload.is_none());
    assert_eq!(
        row.source_channel.parse::<SearchChannel>(),
        Ok(SearchChannel::Linebot)
    );
}

#[tokio::test]
async fn connect_without_database_url_is_rejected_before_dialing() {
    let app_config = build_app_config(|_| Err(std::env::VarError::NotPresent))
        .expect("config builds without DATABASE_URL");
    assert!(app_config.database_url.is_empty());

    let result = connect_pool_from_config(&app_config).await;
    assert!(
        matches!(result, Err(DbError::MissingDatabaseUrl)),
        "expected MissingDatabaseUrl, got: {:?}",
        result.err()
    );
}
