//! Postgres-backed [`LookupCache`] and [`HistoryLog`].

use std::time::Duration;

use chrono::Utc;
use pricefinder_core::{expiry_after, HistoryEntry, HistoryLog, LookupCache, LookupResult};
use sqlx::PgPool;

use crate::price_cache::{touch_fresh_cache_entry, upsert_cache_entry};
use crate::search_history::insert_search_history;
use crate::DbError;

/// Cache and history over one connection pool. Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl LookupCache for PgStore {
    type Error = DbError;

    async fn get_fresh(&self, identifier: &str) -> Result<Option<LookupResult>, Self::Error> {
        let row = touch_fresh_cache_entry(&self.pool, identifier).await?;
        Ok(row.map(|r| r.payload.0))
    }

    async fn put(
        &self,
        identifier: &str,
        result: &LookupResult,
        ttl: Duration,
    ) -> Result<(), Self::Error> {
        let now = Utc::now();
        upsert_cache_entry(&self.pool, identifier, result, now, expiry_after(now, ttl)).await?;
        Ok(())
    }
}

impl HistoryLog for PgStore {
    type Error = DbError;

    async fn append(&self, entry: &HistoryEntry) -> Result<(), Self::Error> {
        insert_search_history(&self.pool, entry).await?;
        Ok(())
    }
}
