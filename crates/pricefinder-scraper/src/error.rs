use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("product search returned status \"{status}\"")]
    SearchStatus { status: String },

    #[error("normalization error for product {serial}: {reason}")]
    Normalization { serial: String, reason: String },

    #[error("element \"{selector}\" not found in {url}")]
    MissingElement { url: String, selector: String },

    #[error("invalid selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("exchange rate \"{raw}\" is not a number")]
    InvalidRate { raw: String },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

/// Why a lookup produced no result.
///
/// Display strings stay generic; the wrapped [`ScraperError`] carries the
/// detail for logs.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("product identifier must not be empty")]
    InvalidIdentifier,

    #[error("product {identifier} not found")]
    NotFound { identifier: String },

    #[error("upstream catalog unavailable")]
    Upstream(#[source] ScraperError),
}

impl LookupError {
    /// Stable machine-readable tag, used for API error codes and history rows.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier => "invalid_identifier",
            Self::NotFound { .. } => "not_found",
            Self::Upstream(_) => "upstream_unavailable",
        }
    }
}
