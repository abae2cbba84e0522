//! HTTP client for the storefront's product pages and commerce API.

mod resolve;
mod variants;

use pricefinder_core::AppConfig;
use reqwest::Url;

use crate::error::ScraperError;
use crate::http::{join_segments, parse_base_url, HttpFetcher, HttpSettings};

pub use resolve::MAX_ALTERNATE_HOPS;

/// Client for the catalog: product pages, product search and variant lists.
///
/// 429, 404 and other non-2xx responses surface as typed errors. Transient
/// failures (429, timeouts, 5xx) are retried with exponential backoff; a 404
/// is never retried because the resolver treats it as a signal.
pub struct CatalogClient {
    http: HttpFetcher,
    base_url: Url,
}

impl CatalogClient {
    /// Creates a `CatalogClient` rooted at `base_url`, e.g. `https://www.uniqlo.com`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidBaseUrl`] if `base_url` does not parse.
    /// - [`ScraperError::Http`] if the underlying `reqwest::Client` cannot be built.
    pub fn new(base_url: &str, settings: &HttpSettings) -> Result<Self, ScraperError> {
        Ok(Self {
            http: HttpFetcher::new(settings)?,
            base_url: parse_base_url(base_url)?,
        })
    }

    /// Creates a `CatalogClient` from the catalog base URL and request policy
    /// in `config`.
    ///
    /// # Errors
    ///
    /// See [`CatalogClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(&config.catalog_base_url, &HttpSettings::from_config(config))
    }

    /// `{base}/jp/ja/products/{serial}`
    pub(crate) fn product_page_url(&self, serial: &str) -> Url {
        join_segments(&self.base_url, &["jp", "ja", "products", serial])
    }

    /// `{base}/jp/api/commerce/v5/ja/products?q={serial}&...`
    pub(crate) fn search_url(&self, serial: &str) -> Url {
        let mut url = join_segments(
            &self.base_url,
            &["jp", "api", "commerce", "v5", "ja", "products"],
        );
        url.query_pairs_mut()
            .append_pair("q", serial)
            .append_pair("queryRelaxationFlag", "true")
            .append_pair("offset", "0")
            .append_pair("limit", "36")
            .append_pair("httpFailure", "true");
        url
    }

    /// `{base}/jp/api/commerce/v5/ja/products/E{serial}-000/price-groups/00/l2s?...`
    pub(crate) fn variants_url(&self, serial: &str) -> Url {
        let product_code = format!("E{serial}-000");
        let mut url = join_segments(
            &self.base_url,
            &[
                "jp",
                "api",
                "commerce",
                "v5",
                "ja",
                "products",
                &product_code,
                "price-groups",
                "00",
                "l2s",
            ],
        );
        url.query_pairs_mut()
            .append_pair("withPrices", "true")
            .append_pair("withStocks", "true")
            .append_pair("includePreviousPrice", "false")
            .append_pair("httpFailure", "true");
        url
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
