//! Domain types, configuration, and storage seams shared by every
//! pricefinder crate.

pub mod app_config;
pub mod codes;
pub mod config;
pub mod products;
pub mod reply;
pub mod store;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use codes::{decode_color, decode_raw_color, decode_raw_size, decode_size};
pub use config::{build_app_config, load_app_config, load_app_config_from_env};
pub use products::{CanonicalEntry, LookupResult, StockStatus, Variant};
pub use reply::{format_failure_reply, format_reply};
pub use store::{
    expiry_after, CachedLookup, HistoryEntry, HistoryLog, LookupCache, MemoryStore, SearchChannel,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
