//! `lookup` command: run one lookup and print the chat reply or JSON.

use pricefinder_core::{
    format_failure_reply, format_reply, AppConfig, HistoryLog, LookupCache, LookupResult,
    MemoryStore, SearchChannel,
};
use pricefinder_db::PgStore;
use pricefinder_scraper::{LookupError, LookupPipeline};

/// Looks up `product_id` with Postgres as cache and history.
///
/// # Errors
///
/// Returns an error if the pipeline cannot be built, the identifier is
/// blank, or the storefront is unavailable. An unknown product is not an
/// error; the failure reply is printed instead.
pub(crate) async fn run_lookup(
    config: &AppConfig,
    pool: sqlx::PgPool,
    product_id: &str,
    json: bool,
) -> anyhow::Result<()> {
    let store = PgStore::new(pool);
    let pipeline = LookupPipeline::from_config(config, store.clone(), store)?;
    run_with(&pipeline, product_id, json).await
}

/// Looks up `product_id` without a database.
///
/// # Errors
///
/// Same as [`run_lookup`].
pub(crate) async fn run_lookup_in_memory(
    config: &AppConfig,
    product_id: &str,
    json: bool,
) -> anyhow::Result<()> {
    let pipeline = LookupPipeline::from_config(config, MemoryStore::new(), MemoryStore::new())?;
    run_with(&pipeline, product_id, json).await
}

async fn run_with<C, H>(
    pipeline: &LookupPipeline<C, H>,
    product_id: &str,
    json: bool,
) -> anyhow::Result<()>
where
    C: LookupCache,
    H: HistoryLog,
{
    let outcome = pipeline
        .lookup_via(product_id, SearchChannel::Cli, None)
        .await;

    let result = match outcome {
        Ok(result) => Some(result),
        Err(LookupError::NotFound { .. }) => None,
        Err(e) => {
            return Err(anyhow::Error::new(e).context(format!("lookup of {product_id} failed")));
        }
    };

    let output = render(result.as_ref(), pipeline.currency(), json)?;
    println!("{output}");
    Ok(())
}

/// Renders a lookup outcome; `None` means the product was not found.
pub(crate) fn render(
    result: Option<&LookupResult>,
    currency: &str,
    json: bool,
) -> anyhow::Result<String> {
    if json {
        let value = serde_json::json!({
            "found": result.is_some(),
            "currency": currency,
            "result": result,
        });
        return Ok(serde_json::to_string_pretty(&value)?);
    }

    let reply = match result {
        Some(result) => format_reply(result, currency),
        None => format_failure_reply(),
    };
    Ok(reply.join("\n\n"))
}
