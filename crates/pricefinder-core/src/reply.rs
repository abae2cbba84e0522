//! Chat reply text for lookup outcomes.
//!
//! Each outcome renders as exactly two chat messages, matching what the
//! messaging layer sends back to the user.

use crate::products::LookupResult;

const NOT_FOUND_MESSAGE: &str = "商品不存在日本Uniqlo哦! (期間限定價格商品可能找不到)";
const RETRY_HINT_MESSAGE: &str = "請重新輸入或按 1 看範例~";
const STOCK_HEADER: &str = "日本官網庫存:";
const STOCK_UNKNOWN_MESSAGE: &str = "日本官網庫存查不到";

/// Renders the two reply messages for a successful lookup.
///
/// The first carries the product link, the JPY price and the converted
/// price. The second lists in-stock sizes per color, or reports that stock
/// could not be determined when the catalog returned no variants.
#[must_use]
pub fn format_reply(result: &LookupResult, currency: &str) -> [String; 2] {
    let price_line = format!(
        "商品連結:\n {}\n商品價格: {}日圓\n{}: {}元",
        result.product_url,
        result.price_jp,
        converted_label(currency),
        result.price_converted
    );

    if result.variants.is_empty() {
        return [price_line, STOCK_UNKNOWN_MESSAGE.to_string()];
    }

    let mut stock_lines = String::from(STOCK_HEADER);
    for (color, sizes) in result.available_sizes_by_color() {
        stock_lines.push_str(&format!("\n{color}: {}", sizes.join(", ")));
    }

    [price_line, stock_lines]
}

/// Renders the two reply messages sent when a lookup fails.
#[must_use]
pub fn format_failure_reply() -> [String; 2] {
    [
        NOT_FOUND_MESSAGE.to_string(),
        RETRY_HINT_MESSAGE.to_string(),
    ]
}

fn converted_label(currency: &str) -> String {
    match currency {
        "TWD" => "折合台幣".to_string(),
        other => format!("折合{other}"),
    }
}
