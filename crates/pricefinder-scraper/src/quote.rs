//! Live JPY exchange rate scraped from a public finance quote page.

use pricefinder_core::AppConfig;
use regex::Regex;
use reqwest::Url;

use crate::error::ScraperError;
use crate::html::{class_text_regex, extract_class_text};
use crate::http::{join_segments, parse_base_url, HttpFetcher, HttpSettings};

/// Fetches the JPY → `currency` rate from `{base}/finance/quote/JPY-{CUR}`.
pub struct QuoteClient {
    http: HttpFetcher,
    base_url: Url,
    currency: String,
    rate_class: String,
    rate_re: Regex,
}

impl QuoteClient {
    /// # Errors
    ///
    /// - [`ScraperError::InvalidBaseUrl`] if `base_url` does not parse.
    /// - [`ScraperError::Http`] if the underlying `reqwest::Client` cannot be built.
    /// - [`ScraperError::InvalidSelector`] if `rate_class` cannot be matched.
    pub fn new(
        base_url: &str,
        currency: &str,
        rate_class: &str,
        settings: &HttpSettings,
    ) -> Result<Self, ScraperError> {
        let rate_re = class_text_regex(rate_class).map_err(|e| ScraperError::InvalidSelector {
            selector: rate_class.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            http: HttpFetcher::new(settings)?,
            base_url: parse_base_url(base_url)?,
            currency: currency.to_ascii_uppercase(),
            rate_class: rate_class.to_owned(),
            rate_re,
        })
    }

    /// # Errors
    ///
    /// See [`QuoteClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            &config.quote_base_url,
            &config.target_currency,
            &config.quote_rate_class,
            &HttpSettings::from_config(config),
        )
    }

    /// Target currency code, upper-cased.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub(crate) fn quote_url(&self) -> Url {
        let pair = format!("JPY-{}", self.currency);
        join_segments(&self.base_url, &["finance", "quote", &pair])
    }

    /// Returns the current rate, or `None` if it could not be obtained.
    ///
    /// Failures are logged at `warn`; a missing rate only zeroes the
    /// converted price, it never fails a lookup.
    pub async fn fetch_rate(&self) -> Option<f64> {
        match self.try_fetch_rate().await {
            Ok(rate) => {
                tracing::debug!(currency = %self.currency, rate, "fetched exchange rate");
                Some(rate)
            }
            Err(e) => {
                tracing::warn!(
                    currency = %self.currency,
                    error = %e,
                    "exchange rate unavailable, converted price will be 0"
                );
                None
            }
        }
    }

    /// Fetches and parses the rate, reporting why it failed.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::MissingElement`] if the page has no element with the
    ///   configured class.
    /// - [`ScraperError::InvalidRate`] if its text is not a positive number.
    /// - Transport errors from the quote request.
    pub async fn try_fetch_rate(&self) -> Result<f64, ScraperError> {
        let url = self.quote_url();
        let body = self.http.get_text(&url, "text/html").await?;
        let raw = extract_class_text(&body, &self.rate_re).ok_or_else(|| {
            ScraperError::MissingElement {
                url: url.to_string(),
                selector: self.rate_class.clone(),
            }
        })?;
        parse_rate(&raw)
    }
}

/// Parses quote text such as `"0.2105"` or `"1,234.56"`.
pub(crate) fn parse_rate(raw: &str) -> Result<f64, ScraperError> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    match cleaned.trim().parse::<f64>() {
        Ok(rate) if rate.is_finite() && rate > 0.0 => Ok(rate),
        _ => Err(ScraperError::InvalidRate {
            raw: raw.to_owned(),
        }),
    }
}
