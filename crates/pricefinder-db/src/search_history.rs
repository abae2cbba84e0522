//! Database operations and read models for `search_history`.

use chrono::{DateTime, Utc};
use pricefinder_core::{HistoryEntry, LookupResult};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::DbError;

const POPULAR_PRODUCTS_LIMIT: i64 = 10;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `search_history` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SearchHistoryRow {
    pub id: i64,
    pub identifier: String,
    pub serial_number: Option<String>,
    pub success: bool,
    pub payload: Option<Json<LookupResult>>,
    pub error_message: Option<String>,
    /// One of `api`, `web`, `linebot`, `cli`.
    pub source_channel: String,
    pub user_id: Option<String>,
    pub searched_at: DateTime<Utc>,
}

/// Successful-search count for one identifier.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PopularProductRow {
    pub identifier: String,
    pub search_count: i64,
}

/// Aggregate usage figures over the whole history.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchStats {
    pub total_searches: i64,
    pub successful_searches: i64,
    /// Percentage of successful searches, rounded to two decimals.
    pub success_rate: f64,
    pub recent_searches_24h: i64,
    /// Top ten successful identifiers by search count.
    pub popular_products: Vec<PopularProductRow>,
}

// ---------------------------------------------------------------------------
// search_history operations
// ---------------------------------------------------------------------------

/// Appends one history entry. Returns the new row `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_search_history(pool: &PgPool, entry: &HistoryEntry) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO search_history \
             (identifier, serial_number, success, payload, error_message, \
              source_channel, user_id, searched_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING id",
    )
    .bind(&entry.identifier)
    .bind(&entry.serial_number)
    .bind(entry.success)
    .bind(entry.payload.as_ref().map(Json))
    .bind(&entry.error)
    .bind(entry.channel.as_str())
    .bind(&entry.user_id)
    .bind(entry.searched_at)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Lists the most recent history rows, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_searches(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<SearchHistoryRow>, DbError> {
    let rows = sqlx::query_as::<_, SearchHistoryRow>(
        "SELECT id, identifier, serial_number, success, payload, error_message, \
                source_channel, user_id, searched_at \
         FROM search_history \
         ORDER BY searched_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Computes [`SearchStats`] over the whole table.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn search_stats(pool: &PgPool) -> Result<SearchStats, DbError> {
    let (total_searches, successful_searches, recent_searches_24h) =
        sqlx::query_as::<_, (i64, i64, i64)>(
            "SELECT COUNT(*), \
                    COUNT(*) FILTER (WHERE success), \
                    COUNT(*) FILTER (WHERE searched_at > NOW() - INTERVAL '24 hours') \
             FROM search_history",
        )
        .fetch_one(pool)
        .await?;

    let popular_products = sqlx::query_as::<_, PopularProductRow>(
        "SELECT identifier, COUNT(*) AS search_count \
         FROM search_history \
         WHERE success \
         GROUP BY identifier \
         ORDER BY search_count DESC, identifier ASC \
         LIMIT $1",
    )
    .bind(POPULAR_PRODUCTS_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(SearchStats {
        total_searches,
        successful_searches,
        success_rate: success_rate(successful_searches, total_searches),
        recent_searches_24h,
        popular_products,
    })
}

/// `successful / max(total, 1) * 100`, rounded to two decimals.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn success_rate(successful: i64, total: i64) -> f64 {
    let ratio = successful as f64 / total.max(1) as f64 * 100.0;
    (ratio * 100.0).round() / 100.0
}
