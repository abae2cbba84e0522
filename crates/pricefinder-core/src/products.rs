use serde::{Deserialize, Serialize};

/// The catalog-confirmed identity of a product, after any alternate-serial
/// hop performed by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEntry {
    /// Six-character catalog serial, e.g. `"474479"`. Always resolvable
    /// against the variant API without further redirection.
    pub serial_number: String,
    /// Storefront product page, e.g. `"https://www.uniqlo.com/jp/ja/products/474479"`.
    pub product_url: String,
    /// Contents of the page `<title>`; empty when it could not be extracted.
    pub page_title: String,
}

/// Stock state of one variant as reported by the catalog.
///
/// The catalog uses upper-snake status codes. The two that matter for the
/// availability report get their own variants; anything else is kept
/// verbatim in [`StockStatus::Other`]. [`StockStatus::Unknown`] marks a
/// variant that had no entry in the stock map at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StockStatus {
    InStock,
    StockOut,
    Other(String),
    Unknown,
}

impl StockStatus {
    /// Maps a raw catalog status code onto a [`StockStatus`].
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "IN_STOCK" => Self::InStock,
            "STOCK_OUT" => Self::StockOut,
            "" | "UNKNOWN" => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::InStock => "IN_STOCK",
            Self::StockOut => "STOCK_OUT",
            Self::Other(code) => code,
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Everything except an explicit `STOCK_OUT` counts as purchasable.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::StockOut)
    }
}

impl From<String> for StockStatus {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<StockStatus> for String {
    fn from(status: StockStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One color × size combination of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Canonical serial of the parent product.
    pub serial: String,
    /// First six characters of the catalog's communication code.
    pub alt_serial: String,
    /// Opaque catalog identifier (`l2Id`); unique within one product.
    pub variant_id: String,
    /// Decoded color label, e.g. `"Black 黑"`.
    pub color: String,
    /// Decoded size label, e.g. `"M"`; empty when the code is not tabled.
    pub size: String,
    pub stock_status: StockStatus,
    /// Base price in JPY.
    pub price: i64,
}

/// The terminal artifact of one lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResult {
    pub serial_number: String,
    pub product_url: String,
    pub page_title: String,
    /// Price of the first variant in catalog order, or `0` with no variants.
    pub price_jp: i64,
    /// `price_jp` converted at the live rate; `0` when no rate was available.
    pub price_converted: i64,
    pub variants: Vec<Variant>,
}

impl LookupResult {
    /// Returns `true` if at least one variant is not sold out.
    #[must_use]
    pub fn has_available_variants(&self) -> bool {
        self.variants.iter().any(|v| v.stock_status.is_available())
    }

    /// Groups purchasable sizes by color.
    ///
    /// Colors appear in order of first appearance among available variants;
    /// sizes keep catalog order. Sold-out variants are skipped entirely.
    #[must_use]
    pub fn available_sizes_by_color(&self) -> Vec<(&str, Vec<&str>)> {
        let mut grouped: Vec<(&str, Vec<&str>)> = Vec::new();
        for variant in self.variants.iter().filter(|v| v.stock_status.is_available()) {
            match grouped.iter_mut().find(|(color, _)| *color == variant.color) {
                Some((_, sizes)) => sizes.push(&variant.size),
                None => grouped.push((&variant.color, vec![&variant.size])),
            }
        }
        grouped
    }
}
