//! Normalization from raw catalog responses to [`pricefinder_core::Variant`].
//!
//! Color and size decoding is delegated to [`pricefinder_core::codes`]; this
//! module joins the `l2s` list with the stock and price maps.

use pricefinder_core::{decode_raw_color, decode_raw_size, StockStatus, Variant};

use crate::error::ScraperError;
use crate::types::{L2Item, VariantsResult};

/// Normalizes a variant response into [`Variant`]s in `l2s` order.
///
/// A variant missing from the stock map gets [`StockStatus::Unknown`]; one
/// missing from the price map gets price `0`.
///
/// # Errors
///
/// Returns [`ScraperError::Normalization`] if an entry has an empty `l2Id`
/// or a price that is not a finite number.
pub fn normalize_variants(
    serial: &str,
    result: &VariantsResult,
) -> Result<Vec<Variant>, ScraperError> {
    result
        .l2s
        .iter()
        .map(|item| normalize_variant(serial, item, result))
        .collect()
}

fn normalize_variant(
    serial: &str,
    item: &L2Item,
    result: &VariantsResult,
) -> Result<Variant, ScraperError> {
    if item.l2_id.is_empty() {
        return Err(ScraperError::Normalization {
            serial: serial.to_owned(),
            reason: "variant has an empty l2Id".into(),
        });
    }

    let stock_status = result
        .stocks
        .get(&item.l2_id)
        .and_then(|s| s.status_code.as_deref())
        .map_or(StockStatus::Unknown, StockStatus::from_code);

    let raw_price = result
        .prices
        .get(&item.l2_id)
        .and_then(|p| p.base.as_ref())
        .and_then(|b| b.value)
        .unwrap_or(0.0);

    Ok(Variant {
        serial: serial.to_owned(),
        alt_serial: item.communication_code.chars().take(6).collect(),
        variant_id: item.l2_id.clone(),
        color: decode_raw_color(&item.color.code).to_owned(),
        size: decode_raw_size(&item.size.code).to_owned(),
        stock_status,
        price: yen(serial, raw_price)?,
    })
}

/// Rounds a catalog price to whole yen.
fn yen(serial: &str, raw: f64) -> Result<i64, ScraperError> {
    if !raw.is_finite() || raw.abs() > 1e15 {
        return Err(ScraperError::Normalization {
            serial: serial.to_owned(),
            reason: format!("price {raw} is out of range"),
        });
    }
    #[allow(clippy::cast_possible_truncation)]
    Ok(raw.round() as i64)
}

/// Extracts the six-character serial from a search hit's `productId`
/// (`"E474479-000"` yields `"474479"`).
///
/// # Errors
///
/// Returns [`ScraperError::Normalization`] if the id is shorter than seven
/// characters.
pub fn serial_from_product_id(product_id: &str) -> Result<String, ScraperError> {
    let serial: String = product_id.chars().skip(1).take(6).collect();
    if serial.chars().count() < 6 {
        return Err(ScraperError::Normalization {
            serial: product_id.to_owned(),
            reason: "search productId is too short to contain a serial".into(),
        });
    }
    Ok(serial)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
