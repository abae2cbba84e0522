//! Product resolution with the search-API fallback for retired serials.

use pricefinder_core::CanonicalEntry;

use crate::error::ScraperError;
use crate::html::extract_title;
use crate::normalize::serial_from_product_id;
use crate::types::SearchResponse;

use super::CatalogClient;

/// How many times a 404 may be redirected through product search before the
/// identifier is declared missing.
pub const MAX_ALTERNATE_HOPS: usize = 1;

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8";

impl CatalogClient {
    /// Resolves a user-supplied identifier to its canonical catalog entry.
    ///
    /// A 2xx product page is canonical as-is. On 404 the search API is asked
    /// for a replacement serial and the page lookup is repeated with it, at
    /// most [`MAX_ALTERNATE_HOPS`] times. Returns `Ok(None)` when the catalog
    /// has no entry for the identifier.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::SearchStatus`] if the search API reports a non-`ok` status.
    /// - [`ScraperError::UnexpectedStatus`], [`ScraperError::RateLimited`] or
    ///   [`ScraperError::Http`] for transport failures on either request.
    /// - [`ScraperError::Deserialize`] if the search response is malformed.
    pub async fn resolve(&self, identifier: &str) -> Result<Option<CanonicalEntry>, ScraperError> {
        let mut serial = identifier.to_owned();
        let mut hops = 0usize;

        loop {
            let url = self.product_page_url(&serial);
            match self.http.get_text(&url, HTML_ACCEPT).await {
                Ok(body) => {
                    return Ok(Some(CanonicalEntry {
                        serial_number: serial,
                        product_url: url.to_string(),
                        page_title: extract_title(&body),
                    }));
                }
                Err(ScraperError::NotFound { .. }) if hops < MAX_ALTERNATE_HOPS => {
                    let Some(alternate) = self.search_alternate(&serial).await? else {
                        tracing::info!(
                            identifier,
                            serial = %serial,
                            "no search match for missing product"
                        );
                        return Ok(None);
                    };
                    tracing::info!(
                        identifier,
                        from = %serial,
                        to = %alternate,
                        "product page missing, following alternate serial"
                    );
                    serial = alternate;
                    hops += 1;
                }
                Err(ScraperError::NotFound { .. }) => {
                    tracing::info!(
                        identifier,
                        serial = %serial,
                        hops,
                        "alternate serial is also missing"
                    );
                    return Ok(None);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Asks product search for a serial to use in place of `serial`.
    ///
    /// Returns `Ok(None)` when the search succeeded but matched nothing.
    async fn search_alternate(&self, serial: &str) -> Result<Option<String>, ScraperError> {
        let url = self.search_url(serial);
        let response: SearchResponse = self
            .http
            .get_json(&url, &format!("product search for {serial}"))
            .await?;

        if response.status != "ok" {
            return Err(ScraperError::SearchStatus {
                status: response.status,
            });
        }

        let result = response.result.unwrap_or_default();
        if result.relaxed_queries.is_empty() {
            return Ok(None);
        }
        match result.items.first() {
            Some(item) => serial_from_product_id(&item.product_id).map(Some),
            None => Ok(None),
        }
    }
}
