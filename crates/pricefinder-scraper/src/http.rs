//! Shared HTTP plumbing for the catalog and quote clients.

use std::time::Duration;

use pricefinder_core::AppConfig;
use reqwest::{Client, Response, StatusCode, Url};

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

/// Request policy shared by every outbound client.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Per-request timeout covering connect, send and body read.
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after the first failure for retriable errors.
    pub max_retries: u32,
    /// Base delay for exponential backoff: `backoff_base_ms * 2^(n-1)`.
    pub backoff_base_ms: u64,
}

impl HttpSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        }
    }
}

/// A `reqwest` client plus the retry policy to use with it.
pub(crate) struct HttpFetcher {
    client: Client,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl HttpFetcher {
    pub(crate) fn new(settings: &HttpSettings) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.timeout_secs.min(10)))
            .user_agent(settings.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            max_retries: settings.max_retries,
            backoff_base_ms: settings.backoff_base_ms,
        })
    }

    /// GETs `url` and returns the body text, retrying transient failures.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::NotFound`] on 404 (never retried).
    /// - [`ScraperError::RateLimited`] on 429 after retries are exhausted.
    /// - [`ScraperError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`ScraperError::Http`] on network, timeout or body read failure.
    pub(crate) async fn get_text(&self, url: &Url, accept: &str) -> Result<String, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let response = self
                .client
                .get(url.clone())
                .header(reqwest::header::ACCEPT, accept)
                .header(reqwest::header::ACCEPT_LANGUAGE, "ja,en;q=0.8")
                .header(reqwest::header::CACHE_CONTROL, "no-cache")
                .send()
                .await?;
            let response = check_status(response, url)?;
            Ok(response.text().await?)
        })
        .await
    }

    /// GETs `url` and deserializes the JSON body into `T`.
    ///
    /// # Errors
    ///
    /// Everything [`HttpFetcher::get_text`] returns, plus
    /// [`ScraperError::Deserialize`] when the body does not match `T`.
    pub(crate) async fn get_json<T>(&self, url: &Url, context: &str) -> Result<T, ScraperError>
    where
        T: serde::de::DeserializeOwned,
    {
        let body = self.get_text(url, "application/json").await?;
        serde_json::from_str::<T>(&body).map_err(|e| ScraperError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

fn check_status(response: Response, url: &Url) -> Result<Response, ScraperError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(ScraperError::RateLimited {
            domain: url.host_str().unwrap_or_default().to_owned(),
            retry_after_secs,
        });
    }

    if status == StatusCode::NOT_FOUND {
        return Err(ScraperError::NotFound {
            url: url.to_string(),
        });
    }

    if !status.is_success() {
        return Err(ScraperError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    Ok(response)
}

/// Parses a configured base URL, rejecting anything that cannot carry a path.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, ScraperError> {
    let url = Url::parse(base_url).map_err(|e| ScraperError::InvalidBaseUrl {
        base_url: base_url.to_owned(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ScraperError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: "URL cannot be a base".to_owned(),
        });
    }
    Ok(url)
}

/// Appends `segments` to `base`'s path, percent-encoding each one.
pub(crate) fn join_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_segments_appends_to_bare_origin() {
        let base = parse_base_url("https://www.uniqlo.com").unwrap();
        let url = join_segments(&base, &["jp", "ja", "products", "474479"]);
        assert_eq!(url.as_str(), "https://www.uniqlo.com/jp/ja/products/474479");
    }

    #[test]
    fn join_segments_keeps_base_path_prefix() {
        let base = parse_base_url("http://127.0.0.1:8080/mirror/").unwrap();
        let url = join_segments(&base, &["jp", "ja", "products", "474479"]);
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/mirror/jp/ja/products/474479"
        );
    }

    #[test]
    fn join_segments_encodes_path_separators() {
        let base = parse_base_url("https://www.uniqlo.com").unwrap();
        let url = join_segments(&base, &["products", "../admin"]);
        assert_eq!(url.as_str(), "https://www.uniqlo.com/products/..%2Fadmin");
    }

    #[test]
    fn parse_base_url_rejects_garbage() {
        assert!(matches!(
            parse_base_url("not a url"),
            Err(ScraperError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            parse_base_url("mailto:someone@example.com"),
            Err(ScraperError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn settings_follow_config() {
        let config = pricefinder_core::build_app_config(|key| match key {
            "DATABASE_URL" => Ok("postgres://localhost/pricefinder".to_owned()),
            "PRICEFINDER_MAX_RETRIES" => Ok("3".to_owned()),
            _ => Err(std::env::VarError::NotPresent),
        })
        .unwrap();
        let settings = HttpSettings::from_config(&config);
        assert_eq!(settings.max_retries, 3);
        assert_eq!(settings.timeout_secs, 10);
        assert_eq!(settings.backoff_base_ms, 500);
    }
}
