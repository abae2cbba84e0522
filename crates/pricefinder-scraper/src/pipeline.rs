//! End-to-end price lookup: cache, resolve, variants + rate, assemble, record.

use std::time::Duration;

use pricefinder_core::{
    AppConfig, HistoryEntry, HistoryLog, LookupCache, LookupResult, SearchChannel,
};

use crate::assemble::assemble;
use crate::client::CatalogClient;
use crate::error::{LookupError, ScraperError};
use crate::quote::QuoteClient;

/// Orchestrates one lookup over the catalog and quote clients.
///
/// Results are written through to `cache` and every uncached attempt is
/// appended to `history`. Store failures are logged and never fail the
/// lookup itself.
pub struct LookupPipeline<C, H> {
    catalog: CatalogClient,
    quote: QuoteClient,
    cache: C,
    history: H,
    cache_ttl: Duration,
}

impl<C, H> LookupPipeline<C, H>
where
    C: LookupCache,
    H: HistoryLog,
{
    #[must_use]
    pub fn new(
        catalog: CatalogClient,
        quote: QuoteClient,
        cache: C,
        history: H,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            catalog,
            quote,
            cache,
            history,
            cache_ttl,
        }
    }

    /// Builds both clients from `config` and uses its cache TTL.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if either HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig, cache: C, history: H) -> Result<Self, ScraperError> {
        Ok(Self::new(
            CatalogClient::from_config(config)?,
            QuoteClient::from_config(config)?,
            cache,
            history,
            Duration::from_secs(config.cache_ttl_secs),
        ))
    }

    #[must_use]
    pub fn cache(&self) -> &C {
        &self.cache
    }

    #[must_use]
    pub fn history(&self) -> &H {
        &self.history
    }

    /// Currency that `price_converted` is expressed in.
    #[must_use]
    pub fn currency(&self) -> &str {
        self.quote.currency()
    }

    /// Looks up `identifier`, recording the attempt under [`SearchChannel::Api`].
    ///
    /// # Errors
    ///
    /// See [`LookupPipeline::lookup_via`].
    pub async fn lookup(&self, identifier: &str) -> Result<LookupResult, LookupError> {
        self.lookup_via(identifier, SearchChannel::Api, None).await
    }

    /// Looks up `identifier` on behalf of `channel` (and optionally a chat user).
    ///
    /// A fresh cache entry is returned as-is without touching the network or
    /// the history log.
    ///
    /// # Errors
    ///
    /// - [`LookupError::InvalidIdentifier`] for a blank identifier, before any I/O.
    /// - [`LookupError::NotFound`] when the catalog has no entry, even after
    ///   the alternate-serial fallback.
    /// - [`LookupError::Upstream`] for transport or response-shape failures.
    pub async fn lookup_via(
        &self,
        identifier: &str,
        channel: SearchChannel,
        user_id: Option<&str>,
    ) -> Result<LookupResult, LookupError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(LookupError::InvalidIdentifier);
        }

        match self.cache.get_fresh(identifier).await {
            Ok(Some(hit)) => {
                tracing::debug!(identifier, serial = %hit.serial_number, "cache hit");
                return Ok(hit);
            }
            Ok(None) => tracing::debug!(identifier, "cache miss"),
            Err(e) => {
                tracing::warn!(identifier, error = %e, "cache read failed, treating as miss");
            }
        }

        let outcome = self.fetch_uncached(identifier).await;

        let entry = match &outcome {
            Ok(result) => {
                if let Err(e) = self.cache.put(identifier, result, self.cache_ttl).await {
                    tracing::warn!(identifier, error = %e, "cache write failed");
                }
                tracing::info!(
                    identifier,
                    serial = %result.serial_number,
                    variants = result.variants.len(),
                    price_jp = result.price_jp,
                    "lookup succeeded"
                );
                HistoryEntry::success(identifier, result, channel, user_id)
            }
            Err(err) => {
                let detail = failure_detail(err);
                tracing::info!(identifier, kind = err.kind(), error = %detail, "lookup failed");
                HistoryEntry::failure(identifier, &detail, channel, user_id)
            }
        };

        if let Err(e) = self.history.append(&entry).await {
            tracing::warn!(identifier, error = %e, "history append failed");
        }

        outcome
    }

    async fn fetch_uncached(&self, identifier: &str) -> Result<LookupResult, LookupError> {
        let entry = self
            .catalog
            .resolve(identifier)
            .await
            .map_err(LookupError::Upstream)?
            .ok_or_else(|| LookupError::NotFound {
                identifier: identifier.to_owned(),
            })?;

        let (variants, rate) = tokio::join!(
            self.catalog.fetch_variants(&entry.serial_number),
            self.quote.fetch_rate(),
        );

        let variants = variants.map_err(|e| match e {
            ScraperError::NotFound { .. } => LookupError::NotFound {
                identifier: identifier.to_owned(),
            },
            other => LookupError::Upstream(other),
        })?;

        Ok(assemble(entry, variants, rate))
    }
}

/// Error text stored with a failed history record. Includes the upstream
/// cause, which the caller-facing message omits.
fn failure_detail(err: &LookupError) -> String {
    match err {
        LookupError::Upstream(source) => format!("{err}: {source}"),
        other => other.to_string(),
    }
}
