//! Storage seams for the lookup pipeline: a read-through result cache and an
//! append-only search history.
//!
//! The Postgres implementations live in `pricefinder-db`; [`MemoryStore`]
//! backs tests and one-off CLI runs.

use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::products::LookupResult;

/// Where a lookup request came from. Stored with each history record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchChannel {
    Api,
    Web,
    Linebot,
    Cli,
}

impl SearchChannel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Web => "web",
            Self::Linebot => "linebot",
            Self::Cli => "cli",
        }
    }
}

impl std::fmt::Display for SearchChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SearchChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "api" => Ok(Self::Api),
            "web" => Ok(Self::Web),
            "linebot" => Ok(Self::Linebot),
            "cli" => Ok(Self::Cli),
            other => Err(format!("unknown search channel \"{other}\"")),
        }
    }
}

/// One lookup attempt, successful or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Identifier exactly as the user supplied it.
    pub identifier: String,
    /// Canonical serial; `None` when resolution failed.
    pub serial_number: Option<String>,
    pub success: bool,
    pub payload: Option<LookupResult>,
    pub error: Option<String>,
    pub channel: SearchChannel,
    /// Messaging-platform user, when the request came through a chat channel.
    pub user_id: Option<String>,
    pub searched_at: DateTime<Utc>,
}

impl HistoryEntry {
    #[must_use]
    pub fn success(
        identifier: &str,
        result: &LookupResult,
        channel: SearchChannel,
        user_id: Option<&str>,
    ) -> Self {
        Self {
            identifier: identifier.to_string(),
            serial_number: Some(result.serial_number.clone()),
            success: true,
            payload: Some(result.clone()),
            error: None,
            channel,
            user_id: user_id.map(str::to_owned),
            searched_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn failure(
        identifier: &str,
        error: &str,
        channel: SearchChannel,
        user_id: Option<&str>,
    ) -> Self {
        Self {
            identifier: identifier.to_string(),
            serial_number: None,
            success: false,
            payload: None,
            error: Some(error.to_string()),
            channel,
            user_id: user_id.map(str::to_owned),
            searched_at: Utc::now(),
        }
    }
}

/// A cached lookup result as stored, keyed by the original identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedLookup {
    pub identifier: String,
    pub serial_number: String,
    pub payload: LookupResult,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub access_count: i64,
    pub last_accessed_at: DateTime<Utc>,
}

/// Read-through cache of lookup results.
pub trait LookupCache: Send + Sync {
    type Error: std::fmt::Display + Send;

    /// Returns the cached result for `identifier` if it has not expired,
    /// recording the access.
    fn get_fresh(
        &self,
        identifier: &str,
    ) -> impl Future<Output = Result<Option<LookupResult>, Self::Error>> + Send;

    /// Inserts or replaces the entry for `identifier`, expiring `ttl` from now.
    fn put(
        &self,
        identifier: &str,
        result: &LookupResult,
        ttl: Duration,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Append-only log of lookup attempts.
pub trait HistoryLog: Send + Sync {
    type Error: std::fmt::Display + Send;

    fn append(&self, entry: &HistoryEntry) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Computes the expiry of an entry written at `now` with the given TTL.
///
/// TTLs too large to represent saturate at the maximum timestamp.
#[must_use]
pub fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Process-local cache and history, guarded by plain mutexes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    cache: Mutex<HashMap<String, CachedLookup>>,
    history: Mutex<Vec<HistoryEntry>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw cache entry for `identifier`, expired or not.
    #[must_use]
    pub fn cached(&self, identifier: &str) -> Option<CachedLookup> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identifier)
            .cloned()
    }

    /// Returns a snapshot of every history entry in append order.
    #[must_use]
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LookupCache for MemoryStore {
    type Error = Infallible;

    async fn get_fresh(&self, identifier: &str) -> Result<Option<LookupResult>, Self::Error> {
        let now = Utc::now();
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = cache.get_mut(identifier) else {
            return Ok(None);
        };
        if entry.expires_at <= now {
            return Ok(None);
        }
        entry.access_count += 1;
        entry.last_accessed_at = now;
        Ok(Some(entry.payload.clone()))
    }

    async fn put(
        &self,
        identifier: &str,
        result: &LookupResult,
        ttl: Duration,
    ) -> Result<(), Self::Error> {
        let now = Utc::now();
        let expires_at = expiry_after(now, ttl);
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache
            .entry(identifier.to_string())
            .and_modify(|entry| {
                entry.serial_number.clone_from(&result.serial_number);
                entry.payload = result.clone();
                entry.cached_at = now;
                entry.expires_at = expires_at;
                entry.access_count += 1;
                entry.last_accessed_at = now;
            })
            .or_insert_with(|| CachedLookup {
                identifier: identifier.to_string(),
                serial_number: result.serial_number.clone(),
                payload: result.clone(),
                cached_at: now,
                expires_at,
                access_count: 1,
                last_accessed_at: now,
            });
        Ok(())
    }
}

impl HistoryLog for MemoryStore {
    type Error = Infallible;

    async fn append(&self, entry: &HistoryEntry) -> Result<(), Self::Error> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
