//! Database operations for `price_cache`.

use chrono::{DateTime, Utc};
use pricefinder_core::{CachedLookup, LookupResult};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `price_cache` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PriceCacheRow {
    pub id: i64,
    pub identifier: String,
    pub serial_number: String,
    pub payload: Json<LookupResult>,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub access_count: i64,
    pub last_accessed_at: DateTime<Utc>,
}

impl From<PriceCacheRow> for CachedLookup {
    fn from(row: PriceCacheRow) -> Self {
        Self {
            identifier: row.identifier,
            serial_number: row.serial_number,
            payload: row.payload.0,
            cached_at: row.cached_at,
            expires_at: row.expires_at,
            access_count: row.access_count,
            last_accessed_at: row.last_accessed_at,
        }
    }
}

const CACHE_COLUMNS: &str = "id, identifier, serial_number, payload, cached_at, expires_at, \
                             access_count, last_accessed_at";

// ---------------------------------------------------------------------------
// price_cache operations
// ---------------------------------------------------------------------------

/// Returns the unexpired entry for `identifier`, bumping `access_count` and
/// `last_accessed_at` in the same statement.
///
/// Returns `None` when there is no entry or it has expired; expired rows are
/// left in place for the next [`upsert_cache_entry`] to overwrite.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails or the payload does not
/// decode as a [`LookupResult`].
pub async fn touch_fresh_cache_entry(
    pool: &PgPool,
    identifier: &str,
) -> Result<Option<PriceCacheRow>, DbError> {
    let row = sqlx::query_as::<_, PriceCacheRow>(&format!(
        "UPDATE price_cache \
         SET access_count = access_count + 1, last_accessed_at = NOW() \
         WHERE identifier = $1 AND expires_at > NOW() \
         RETURNING {CACHE_COLUMNS}"
    ))
    .bind(identifier)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the entry for `identifier` regardless of expiry, without
/// recording an access.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_cache_entry(
    pool: &PgPool,
    identifier: &str,
) -> Result<Option<PriceCacheRow>, DbError> {
    let row = sqlx::query_as::<_, PriceCacheRow>(&format!(
        "SELECT {CACHE_COLUMNS} FROM price_cache WHERE identifier = $1"
    ))
    .bind(identifier)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts or replaces the cache entry for `identifier`.
///
/// Conflicts on `identifier` replace `serial_number`, `payload`, `cached_at`
/// and `expires_at`, and count as an access.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_cache_entry(
    pool: &PgPool,
    identifier: &str,
    result: &LookupResult,
    cached_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> Result<PriceCacheRow, DbError> {
    let row = sqlx::query_as::<_, PriceCacheRow>(&format!(
        "INSERT INTO price_cache \
             (identifier, serial_number, payload, cached_at, expires_at, \
              access_count, last_accessed_at) \
         VALUES ($1, $2, $3, $4, $5, 1, $4) \
         ON CONFLICT (identifier) DO UPDATE SET \
             serial_number    = EXCLUDED.serial_number, \
             payload          = EXCLUDED.payload, \
             cached_at        = EXCLUDED.cached_at, \
             expires_at       = EXCLUDED.expires_at, \
             access_count     = price_cache.access_count + 1, \
             last_accessed_at = EXCLUDED.last_accessed_at \
         RETURNING {CACHE_COLUMNS}"
    ))
    .bind(identifier)
    .bind(&result.serial_number)
    .bind(Json(result))
    .bind(cached_at)
    .bind(expires_at)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
