use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] if a value is present but invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_url = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        let trimmed = raw.trim_end_matches('/');
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Ok(trimmed.to_string())
        } else {
            Err(invalid(var, format!("\"{raw}\" is not an http(s) URL")))
        }
    };

    // Blank means "no database"; commands that need one reject it when connecting.
    let database_url = or_default("DATABASE_URL", "");
    let env = parse_environment(&or_default("PRICEFINDER_ENV", "development"))?;

    let bind_addr = parse_addr("PRICEFINDER_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("PRICEFINDER_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("PRICEFINDER_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("PRICEFINDER_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("PRICEFINDER_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let catalog_base_url = parse_url("PRICEFINDER_CATALOG_BASE_URL", "https://www.uniqlo.com")?;
    let quote_base_url = parse_url("PRICEFINDER_QUOTE_BASE_URL", "https://www.google.com")?;

    let target_currency = or_default("PRICEFINDER_TARGET_CURRENCY", "TWD").to_uppercase();
    if target_currency.len() != 3 || !target_currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid(
            "PRICEFINDER_TARGET_CURRENCY",
            format!("\"{target_currency}\" is not a 3-letter currency code"),
        ));
    }
    let quote_rate_class = or_default("PRICEFINDER_QUOTE_RATE_CLASS", "YMlKec fxKbKc");

    let request_timeout_secs = parse_u64("PRICEFINDER_REQUEST_TIMEOUT_SECS", "10")?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "PRICEFINDER_REQUEST_TIMEOUT_SECS",
            "must be at least 1 second".to_string(),
        ));
    }
    let user_agent = or_default("PRICEFINDER_USER_AGENT", "pricefinder/0.1 (price-lookup)");
    let max_retries = parse_u32("PRICEFINDER_MAX_RETRIES", "1")?;
    let retry_backoff_base_ms = parse_u64("PRICEFINDER_RETRY_BACKOFF_BASE_MS", "500")?;
    let cache_ttl_secs = parse_u64("PRICEFINDER_CACHE_TTL_SECS", "3600")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        catalog_base_url,
        quote_base_url,
        target_currency,
        quote_rate_class,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        cache_ttl_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PRICEFINDER_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
