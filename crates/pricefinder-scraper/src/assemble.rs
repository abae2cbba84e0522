use pricefinder_core::{CanonicalEntry, LookupResult, Variant};

/// Builds the lookup result for a resolved product.
///
/// `price_jp` is the first variant's price, `0` without variants.
/// `price_converted` is `round(price_jp * rate)`, `0` without a rate.
#[must_use]
pub fn assemble(entry: CanonicalEntry, variants: Vec<Variant>, rate: Option<f64>) -> LookupResult {
    let price_jp = variants.first().map_or(0, |v| v.price);
    LookupResult {
        serial_number: entry.serial_number,
        product_url: entry.product_url,
        page_title: entry.page_title,
        price_jp,
        price_converted: rate.map_or(0, |r| convert(price_jp, r)),
        variants,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn convert(price: i64, rate: f64) -> i64 {
    (price as f64 * rate).round() as i64
}
