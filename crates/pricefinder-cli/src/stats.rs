use chrono::{DateTime, Utc};
use pricefinder_db::{SearchHistoryRow, SearchStats};

/// Prints aggregate search statistics followed by the latest searches.
///
/// # Errors
///
/// Returns an error if either database query fails.
pub(crate) async fn run_stats(pool: &sqlx::PgPool, recent: i64) -> anyhow::Result<()> {
    let stats = pricefinder_db::search_stats(pool).await?;
    for line in format_stats(&stats) {
        println!("{line}");
    }

    let rows = pricefinder_db::list_recent_searches(pool, recent.clamp(1, 200)).await?;
    if rows.is_empty() {
        println!("\nno searches recorded yet");
        return Ok(());
    }

    println!();
    println!(
        "{:<18}{:<10}{:<10}{:<9}IDENTIFIER",
        "SEARCHED AT", "CHANNEL", "SERIAL", "OK"
    );
    for row in &rows {
        println!("{}", format_history_row(row));
    }

    Ok(())
}

pub(crate) fn format_stats(stats: &SearchStats) -> Vec<String> {
    let mut lines = vec![
        format!("total searches:      {}", stats.total_searches),
        format!("successful searches: {}", stats.successful_searches),
        format!("success rate:        {:.2}%", stats.success_rate),
        format!("last 24 hours:       {}", stats.recent_searches_24h),
    ];

    if !stats.popular_products.is_empty() {
        lines.push("popular products:".to_string());
        lines.extend(
            stats
                .popular_products
                .iter()
                .enumerate()
                .map(|(i, p)| format!("  {:>2}. {} ({})", i + 1, p.identifier, p.search_count)),
        );
    }

    lines
}

fn format_history_row(row: &SearchHistoryRow) -> String {
    format!(
        "{:<18}{:<10}{:<10}{:<9}{}",
        fmt_timestamp(row.searched_at),
        row.source_channel,
        row.serial_number.as_deref().unwrap_or("-"),
        if row.success { "yes" } else { "no" },
        row.identifier
    )
}

fn fmt_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}
